//! Edge handler for Tether.
//!
//! Serves four fixed payloads (the page, the offline page, the worker
//! script and a JSON API stub) and a plain-text 404 for everything else.

pub mod assets;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::EdgeConfig;
pub use routes::build_app;
pub use state::AppState;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Bind and serve until the process is stopped.
pub async fn serve(config: EdgeConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Edge server listening");
    let app = build_app(Arc::new(AppState::new(config)));
    axum::serve(listener, app).await
}
