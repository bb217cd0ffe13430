use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{BootstrapResponse, SessionResponse, SigninRequest, SigninResponse, SignupRequest},
    extractors::AuthUser,
};
use crate::{
    error::{AppError, AppResult},
    responses::MessageResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/session", get(session))
        .route("/auth/signout", post(signout))
        .route("/auth/bootstrap", post(bootstrap))
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::Validation(e.body_text()))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let req = json_body(payload)?;
    state.auth.sign_up(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("User successfully registered")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> AppResult<Json<SigninResponse>> {
    let req = json_body(payload)?;
    let token = state.auth.sign_in(&req.email, &req.password).await?;
    Ok(Json(SigninResponse {
        success: true,
        token,
    }))
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn session(auth: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        message: "User token is valid".into(),
        token: auth.token,
        user: auth.user,
    })
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn signout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    state.auth.sign_out(auth.user.id).await?;
    Ok(Json(MessageResponse::ok("Signed out")))
}

#[instrument(skip(state))]
pub async fn bootstrap(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<BootstrapResponse>)> {
    let id = state.auth.bootstrap_admin().await?;
    Ok((
        StatusCode::CREATED,
        Json(BootstrapResponse {
            success: true,
            message: "Administrator created".into(),
            id,
        }),
    ))
}
