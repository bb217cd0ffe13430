use axum::{middleware, Router};

use crate::{auth::admin::require_admin, state::AppState};

pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;

/// Read-only order views, admin only.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::order_routes().route_layer(middleware::from_fn_with_state(state, require_admin))
}
