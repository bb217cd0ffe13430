use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub address: Option<String>,
    pub zipcode: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub admin: bool,
    #[serde(skip_serializing)]
    pub token_version: i32, // must match the `ver` claim of a live token
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload; the password is already hashed. The admin flag is
/// chosen by the store method, not the payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub address: Option<String>,
    pub zipcode: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

/// Partial update. `None` leaves the column untouched; a new
/// `password_hash` also bumps `token_version`.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub address: Option<String>,
    pub zipcode: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
}
