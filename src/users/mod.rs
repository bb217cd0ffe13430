use axum::{middleware, Router};

use crate::{auth::admin::require_admin, state::AppState};

mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;

/// User administration, every route behind the admin gate.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::user_routes().route_layer(middleware::from_fn_with_state(state, require_admin))
}
