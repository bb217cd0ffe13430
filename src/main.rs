mod app;
mod auth;
mod config;
mod db;
mod error;
mod orders;
mod responses;
mod state;
mod users;

use crate::{config::AppConfig, error::AppError, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "storefront=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let bootstrap = config.admin.is_some();
    let state = AppState::init(config, pool);

    if bootstrap {
        match state.auth.bootstrap_admin().await {
            Ok(id) => tracing::info!(admin_id = %id, "administrator bootstrapped"),
            Err(AppError::AdminAlreadyExists) => {
                tracing::info!("administrator already present, bootstrap skipped")
            }
            Err(e) => tracing::warn!(error = %e, "admin bootstrap failed; continuing"),
        }
    }

    app::serve(app::build_app(state)).await
}
