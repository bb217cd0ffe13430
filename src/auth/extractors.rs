use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::User,
};

/// Pulls the credential out of `Authorization: Bearer <token>`.
///
/// Scheme match is case-insensitive. An absent header or empty credential
/// is `MissingToken`; a bare token or any other scheme is `InvalidToken`.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let raw = headers.get(AUTHORIZATION).ok_or(AppError::MissingToken)?;
    let value = raw.to_str().map_err(|_| AppError::InvalidToken)?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("bearer") {
        return Err(AppError::MissingToken);
    }

    let (scheme, token) = value.split_once(' ').ok_or(AppError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::InvalidToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::MissingToken);
    }
    Ok(token)
}

/// Resolved session: the live user plus the token that proved it.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?.to_owned();
        let user = state.auth.validate_session(&token).await?;
        Ok(AuthUser { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn accepts_bearer_scheme_any_case() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn missing_header_or_credential() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer ")),
            Err(AppError::MissingToken)
        ));
    }

    #[test]
    fn bare_token_and_other_schemes_are_invalid() {
        assert!(matches!(
            bearer_token(&headers("abc.def.ghi")),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwdw==")),
            Err(AppError::InvalidToken)
        ));
    }
}
