use serde::Deserialize;

/// Partial profile update. Has no admin flag.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub zipcode: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
}
