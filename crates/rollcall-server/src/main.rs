//! # rollcall-server
//!
//! HTTP server for the rollcall attendance system.
//!
//! This binary provides:
//! - REST API for attendance marking, broadcast sessions, and geofence checks
//! - OpenAPI documentation via Swagger UI at `/docs`
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package rollcall-server
//!
//! # Production
//! ROLLCALL_ENV=production ./rollcall-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

use rollcall_core::RollcallConfig;
use tokio::net::TcpListener;
use tracing::info;

use rollcall_server::{api, logging, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("ROLLCALL_ENV")
        .map(|env| env == "production")
        .unwrap_or(false);
    logging::init(is_production)?;

    info!("Starting rollcall-server");

    let config = RollcallConfig::load()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config)?;
    let app = api::create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
