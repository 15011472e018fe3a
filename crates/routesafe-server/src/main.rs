//! RouteSafe Server - HGV route planning with low-bridge avoidance

mod api;
mod config;
mod loader;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::state::AppState;
use routesafe_core::ClearanceEngine;
use routesafe_ors::OrsClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("routesafe_server=debug".parse()?))
        .init();

    tracing::info!("Starting RouteSafe server...");

    let config = Config::from_env();
    if config.ors_api_key.is_empty() {
        tracing::warn!("ORS_API_KEY is not set; routing requests will fail");
    }

    let catalog = loader::load_catalog(&config.bridge_csv_path);
    tracing::info!(
        "Loaded {} bridges from {}",
        catalog.len(),
        config.bridge_csv_path
    );

    let port = config.server_port;
    let engine = ClearanceEngine::new(Arc::new(catalog), config.clearance_rules());
    let ors = OrsClient::new(
        config.ors_base_url.clone(),
        config.ors_api_key.clone(),
        Duration::from_secs(config.router_timeout_s),
    );
    let state = Arc::new(AppState::new(engine, ors, config));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
