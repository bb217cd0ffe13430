use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tokio::sync::{Mutex, OnceCell};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    dto::SignupRequest,
    jwt::JwtKeys,
    password::{hash_password_async, verify_password_async},
};
use crate::{
    config::AdminProfile,
    error::{AppError, AppResult},
    users::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn validate_registration(req: &SignupRequest) -> AppResult<()> {
    require(&req.firstname, "firstname")?;
    require(&req.lastname, "lastname")?;
    require(&req.email, "email")?;
    require(&req.password, "password")?;
    if !is_valid_email(&req.email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(())
}

/// Password verification, token issuance and session resolution.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
    admin_profile: Option<AdminProfile>,
    bootstrap_lock: Mutex<()>,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        keys: JwtKeys,
        admin_profile: Option<AdminProfile>,
    ) -> Self {
        Self {
            users,
            keys,
            admin_profile,
            bootstrap_lock: Mutex::new(()),
            dummy_hash: OnceCell::new(),
        }
    }

    #[cfg(test)]
    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<String> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".into(),
            ));
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            self.verify_against_dummy(password).await?;
            warn!(email = %email, "signin unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let ok = verify_password_async(password.to_owned(), user.password_hash.clone()).await?;
        if !ok {
            warn!(email = %email, user_id = %user.id, "signin invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.sign(user.id, user.token_version)?;
        info!(user_id = %user.id, "user signed in");
        Ok(token)
    }

    /// Pays the same Argon2 cost as a real verification, so an unknown
    /// email takes as long as a wrong password.
    async fn verify_against_dummy(&self, password: &str) -> AppResult<()> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_password_async(Uuid::new_v4().to_string()))
            .await?;
        verify_password_async(password.to_owned(), hash.clone()).await?;
        Ok(())
    }

    /// Registers a regular (non-admin) user. Does not sign in.
    pub async fn sign_up(&self, req: SignupRequest) -> AppResult<User> {
        validate_registration(&req)?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            warn!(email = %req.email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password_async(req.password).await?;
        let user = self
            .users
            .create(NewUser {
                firstname: req.firstname,
                lastname: req.lastname,
                email: req.email,
                password_hash,
                address: req.address,
                zipcode: req.zipcode,
                city: req.city,
                phone: req.phone,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Creates the configured administrator unless one already exists.
    ///
    /// The existence check and the insert run under one lock; the store's
    /// `create_admin` repeats the check atomically for other processes.
    pub async fn bootstrap_admin(&self) -> AppResult<Uuid> {
        let profile = self
            .admin_profile
            .as_ref()
            .ok_or(AppError::BootstrapDisabled)?;

        let _guard = self.bootstrap_lock.lock().await;

        if self.users.admin_exists().await? {
            info!("admin bootstrap skipped, an administrator already exists");
            return Err(AppError::AdminAlreadyExists);
        }
        if self.users.find_by_email(&profile.email).await?.is_some() {
            error!(email = %profile.email, "bootstrap email belongs to a regular user");
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password_async(profile.password.clone()).await?;
        let user = self
            .users
            .create_admin(NewUser {
                firstname: profile.firstname.clone(),
                lastname: profile.lastname.clone(),
                email: profile.email.clone(),
                password_hash,
                address: None,
                zipcode: None,
                city: None,
                phone: None,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "bootstrap admin created");
        Ok(user.id)
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn validate_session(&self, token: &str) -> AppResult<User> {
        let claims = self.keys.verify(token)?;

        let Some(user) = self.users.find_by_id(claims.sub).await? else {
            warn!(user_id = %claims.sub, "token subject no longer exists");
            return Err(AppError::UserNotFound);
        };

        if user.token_version != claims.ver {
            warn!(user_id = %user.id, "token revoked");
            return Err(AppError::InvalidToken);
        }

        Ok(user)
    }

    /// Revokes every token the user currently holds.
    pub async fn sign_out(&self, user_id: Uuid) -> AppResult<()> {
        self.users
            .bump_token_version(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        info!(user_id = %user_id, "user signed out");
        Ok(())
    }
}
