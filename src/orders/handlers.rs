use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::repo_types::{Order, OrderDetail};
use crate::{
    error::{AppError, AppResult},
    responses::ResultsResponse,
    state::AppState,
    users::handlers::path_id,
};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/user/:id", get(orders_of_user))
        .route("/orders/:id/details", get(order_details))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
) -> AppResult<Json<ResultsResponse<Vec<Order>>>> {
    let orders = state.orders.list().await?;
    Ok(Json(ResultsResponse::ok(orders)))
}

#[instrument(skip(state))]
pub async fn orders_of_user(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ResultsResponse<Vec<Order>>>> {
    let user_id = path_id(path)?;
    if state.users.find_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }
    let orders = state.orders.list_by_user(user_id).await?;
    Ok(Json(ResultsResponse::ok(orders)))
}

#[instrument(skip(state))]
pub async fn order_details(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ResultsResponse<Vec<OrderDetail>>>> {
    let order_id = path_id(path)?;
    if state.orders.find_by_id(order_id).await?.is_none() {
        return Err(AppError::NotFound("Order not found".into()));
    }
    let lines = state.orders.details(order_id).await?;
    Ok(Json(ResultsResponse::ok(lines)))
}
