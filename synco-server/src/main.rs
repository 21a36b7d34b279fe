//! synco-server — booking backend for children's sports classes
//!
//! Long-running service that:
//! - Manages venues, class schedules and membership plans
//! - Runs the booking lifecycle (trials, waiting lists, memberships,
//!   freezes, cancellations) inside per-operation transactions
//! - Charges memberships through the bank-debit and card gateways
//! - Sends booking confirmation emails over SMTP

mod api;
mod auth;
mod config;
mod db;
mod email;
mod error;
mod payments;
mod services;
mod state;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "synco_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting synco-server (env: {})", config.environment);

    // Initialize application state
    let state = AppState::new(&config).await?;

    // Build router
    let app = api::create_router(state);

    // Start HTTP server
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("synco-server HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
