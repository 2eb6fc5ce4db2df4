//! Menu bot
//!
//! Walks chat users through a tenant's tree of canned replies, one inbound
//! message at a time per sender.

mod api;
mod config;
mod db;
mod runtime;
mod state_machine;
mod transport;

use api::{create_router, AppState};
use config::Config;
use db::Database;
use runtime::{BotRuntime, DatabaseNodeStore, ProductionRuntime, Transport};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::HttpBridgeTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menu_bot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    // Connect to the transport bridge
    let transport: Arc<dyn Transport> = Arc::new(HttpBridgeTransport::new(&config.bridge_url)?);
    let runtime: Arc<ProductionRuntime> = Arc::new(BotRuntime::new(
        DatabaseNodeStore::new(db),
        transport,
        config.tenant_id.clone(),
        config.runtime_settings(),
    ));

    // The bridge may come up later and report itself through the webhook
    match runtime.transport().initialize().await {
        Ok(()) => tracing::info!(bridge = %config.bridge_url, "Transport initialization requested"),
        Err(e) => tracing::warn!(bridge = %config.bridge_url, error = %e, "Transport bridge not reachable"),
    }

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(runtime))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(tenant = %config.tenant_id, "Menu bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
