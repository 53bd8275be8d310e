//! Briefwork Platform Server
//!
//! Serves the platform request handlers. Identity verification is delegated
//! to the fronting proxy, which installs the verified caller id in the
//! `x-caller-id` header before requests reach this process.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BW_API_PORT` | `8080` | HTTP API port |
//! | `BW_BLOB_BASE_URL` | `https://blobs.local` | Base URL for signed blob URLs |
//! | `RUST_LOG` | `info` | Log level |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bw_platform::api::{router, AppState};
use bw_store::{MemoryBlobStore, MemoryStore};

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("starting Briefwork platform server");

    let api_port: u16 = env_or_parse("BW_API_PORT", 8080);
    let blob_base_url = env_or("BW_BLOB_BASE_URL", "https://blobs.local");

    // Dev wiring: the in-memory store. Production deployments plug a real
    // document-database adapter into the same ports.
    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(MemoryBlobStore::new(blob_base_url));
    let state = AppState::new(store, blobs);

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(router(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let addr = SocketAddr::from(([0, 0, 0, 0], api_port));
    info!("API listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Briefwork platform server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
