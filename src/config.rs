use anyhow::Context;
use serde::Deserialize;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Fixed profile used to create the first administrator.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminProfile {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub admin: Option<AdminProfile>,
    pub frontend_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes long");
        }
        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "storefront".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "storefront-clients".into()),
        };

        let admin = match (
            std::env::var("ADMIN_EMAIL").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminProfile {
                    firstname: std::env::var("ADMIN_FIRSTNAME").unwrap_or_else(|_| "Admin".into()),
                    lastname: std::env::var("ADMIN_LASTNAME").unwrap_or_else(|_| "Admin".into()),
                    email,
                    password,
                })
            }
            _ => None,
        };

        let frontend_url = std::env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            jwt,
            admin,
            frontend_url,
        })
    }
}
