use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::UpdateUserRequest,
    repo_types::{User, UserChanges},
};
use crate::{
    auth::{
        admin::CurrentUser,
        dto::SignupRequest,
        handlers::json_body,
        password::hash_password_async,
        services::is_valid_email,
    },
    error::{AppError, AppResult},
    responses::{IdResponse, MessageResponse, ResultsResponse},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub(crate) fn path_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::Validation("Bad request. Invalid id".into()))
}

fn non_empty(value: Option<String>, field: &str) -> AppResult<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(AppError::Validation(format!("{field} must not be empty")))
        }
        other => Ok(other),
    }
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
) -> AppResult<Json<ResultsResponse<Vec<User>>>> {
    let users = state.users.list().await?;
    Ok(Json(ResultsResponse::ok(users)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ResultsResponse<User>>> {
    let id = path_id(path)?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(ResultsResponse::ok(user)))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<IdResponse>)> {
    let req = json_body(payload)?;
    let user = state.auth.sign_up(req).await?;
    info!(user_id = %user.id, "user created by admin");
    Ok((
        StatusCode::CREATED,
        Json(IdResponse {
            success: true,
            id: user.id,
        }),
    ))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<IdResponse>> {
    let id = path_id(path)?;
    let req = json_body(payload)?;

    let email = non_empty(req.email, "email")?;
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email".into()));
        }
    }
    let password_hash = match non_empty(req.password, "password")? {
        Some(plain) => Some(hash_password_async(plain).await?),
        None => None,
    };

    let changes = UserChanges {
        firstname: non_empty(req.firstname, "firstname")?,
        lastname: non_empty(req.lastname, "lastname")?,
        email,
        password_hash,
        address: req.address,
        zipcode: req.zipcode,
        city: req.city,
        phone: req.phone,
    };
    let password_changed = changes.password_hash.is_some();

    let user = state
        .users
        .update(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, password_changed, "user updated");
    Ok(Json(IdResponse {
        success: true,
        id: user.id,
    }))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let id = path_id(path)?;
    if id == admin.id {
        return Err(AppError::Validation(
            "Administrators cannot delete their own account".into(),
        ));
    }
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id = %id, "user deleted");
    Ok(Json(MessageResponse::ok(format!("User {id} successfully deleted"))))
}
