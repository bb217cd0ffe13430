use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{
    config::JwtConfig,
    error::{AppError, AppResult},
};

/// Lifetime of every issued token.
pub const TOKEN_TTL: Duration = Duration::hours(1);

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn sign(&self, user_id: Uuid, token_version: i32) -> AppResult<String> {
        self.sign_at(user_id, token_version, OffsetDateTime::now_utc())
    }

    pub fn sign_at(
        &self,
        user_id: Uuid,
        token_version: i32,
        issued_at: OffsetDateTime,
    ) -> AppResult<String> {
        let exp = issued_at + TOKEN_TTL;
        let claims = Claims {
            sub: user_id,
            iat: issued_at.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            ver: token_version,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("jwt encode: {e}")))?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry (no leeway).
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AppError::InvalidToken
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        })
    }

    const SECRET: &str = "unit-test-secret-that-is-long-enough-0001";

    #[test]
    fn sign_and_verify_token() {
        let keys = make_keys(SECRET, "test-issuer", "test-aud");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, 3).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.ver, 3);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn valid_at_59_minutes_expired_at_61() {
        let keys = make_keys(SECRET, "iss", "aud");
        let now = OffsetDateTime::now_utc();

        let fresh_enough = keys
            .sign_at(Uuid::new_v4(), 0, now - Duration::minutes(59))
            .unwrap();
        assert!(keys.verify(&fresh_enough).is_ok());

        let stale = keys
            .sign_at(Uuid::new_v4(), 0, now - Duration::minutes(61))
            .unwrap();
        assert!(matches!(keys.verify(&stale), Err(AppError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let good = make_keys(SECRET, "iss", "aud");
        let bad = make_keys("another-secret-that-is-long-enough-0002", "iss", "aud");
        let token = good.sign(Uuid::new_v4(), 0).unwrap();
        assert!(matches!(bad.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys(SECRET, "good-iss", "good-aud");
        let bad = make_keys(SECRET, "bad-iss", "bad-aud");
        let token = good.sign(Uuid::new_v4(), 0).unwrap();
        assert!(matches!(bad.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys(SECRET, "iss", "aud");
        assert!(matches!(
            keys.verify("invalid.token.here"),
            Err(AppError::InvalidToken)
        ));
    }
}
