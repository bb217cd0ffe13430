use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::extractors::bearer_token;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::User,
};

/// The admin that passed the gate, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Lets the request through only for a live session of an admin user.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(req.headers())?.to_owned();
    let user = state.auth.validate_session(&token).await?;

    if !user.admin {
        warn!(user_id = %user.id, path = %req.uri().path(), "admin route denied");
        return Err(AppError::Forbidden);
    }

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
