use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, Postgres},
    query::QueryAs,
    PgPool,
};
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserChanges};
use crate::error::{is_unique_violation, AppError, AppResult};

const EMAIL_CONSTRAINT: &str = "users_email_key";
/// Key for the transaction-scoped advisory lock taken by `create_admin`.
const ADMIN_BOOTSTRAP_LOCK: i64 = 0x5354_4f52_4546_524e;

const USER_COLUMNS: &str = "id, firstname, lastname, email, password_hash, address, zipcode, \
                            city, phone, admin, token_version, created_at";

/// Persistence operations the auth core and the user handlers need.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn admin_exists(&self) -> AppResult<bool>;
    /// Inserts a regular user. Fails with `DuplicateEmail`; nothing is
    /// written in that case.
    async fn create(&self, user: NewUser) -> AppResult<User>;
    /// Inserts `user` as an administrator unless any admin exists
    /// (`AdminAlreadyExists`). Check and insert are atomic across processes.
    async fn create_admin(&self, user: NewUser) -> AppResult<User>;
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<Option<User>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    /// Invalidates every token issued so far. Returns the new version.
    async fn bump_token_version(&self, id: Uuid) -> AppResult<Option<i32>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err, EMAIL_CONSTRAINT) {
        AppError::DuplicateEmail
    } else {
        AppError::Database(err)
    }
}

fn insert_user<'q>(
    sql: &'q str,
    user: &'q NewUser,
    admin: bool,
) -> QueryAs<'q, Postgres, User, PgArguments> {
    sqlx::query_as::<_, User>(sql)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.address)
        .bind(user.zipcode)
        .bind(&user.city)
        .bind(&user.phone)
        .bind(admin)
}

fn insert_sql() -> String {
    format!(
        r#"
        INSERT INTO users
            (firstname, lastname, email, password_hash, address, zipcode, city, phone, admin)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {USER_COLUMNS}
        "#
    )
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE admin)")
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let sql = insert_sql();
        insert_user(&sql, &user, false)
            .fetch_one(&self.db)
            .await
            .map_err(map_write_error)
    }

    async fn create_admin(&self, user: NewUser) -> AppResult<User> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIN_BOOTSTRAP_LOCK)
            .execute(&mut *tx)
            .await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE admin)")
            .fetch_one(&mut *tx)
            .await?;
        if exists {
            // dropping `tx` rolls back and releases the lock
            return Err(AppError::AdminAlreadyExists);
        }

        let sql = insert_sql();
        let admin = insert_user(&sql, &user, true)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await?;
        Ok(admin)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                firstname     = COALESCE($2, firstname),
                lastname      = COALESCE($3, lastname),
                email         = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash),
                address       = COALESCE($6, address),
                zipcode       = COALESCE($7, zipcode),
                city          = COALESCE($8, city),
                phone         = COALESCE($9, phone),
                token_version = token_version + CASE WHEN $5 IS NULL THEN 0 ELSE 1 END
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.firstname)
        .bind(&changes.lastname)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.address)
        .bind(changes.zipcode)
        .bind(&changes.city)
        .bind(&changes.phone)
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_error)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn bump_token_version(&self, id: Uuid) -> AppResult<Option<i32>> {
        let version = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET token_version = token_version + 1 WHERE id = $1 RETURNING token_version",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::test_support::unique_violation;

    #[test]
    fn email_violation_maps_to_duplicate_email() {
        let err = map_write_error(unique_violation("23505", "users_email_key"));
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[test]
    fn other_write_errors_stay_database_errors() {
        assert!(matches!(
            map_write_error(unique_violation("23505", "wishlist_user_id_product_id_key")),
            AppError::Database(_)
        ));
        assert!(matches!(
            map_write_error(unique_violation("23503", "users_email_key")),
            AppError::Database(_)
        ));
        assert!(matches!(
            map_write_error(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }
}
