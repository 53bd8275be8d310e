//! Briefwork Outbox Processor
//!
//! Polls the outbox for due delivery obligations and dispatches each
//! referenced domain event to the notification sink, applying the
//! backoff/dead-letter policy.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BW_SINK_URL` | - | Notification sink endpoint (required) |
//! | `BW_SIGNING_SECRET` | - | HMAC-SHA256 secret for delivery signatures |
//! | `BW_POLL_INTERVAL_MS` | `1000` | Poll interval in milliseconds |
//! | `BW_BATCH_SIZE` | `100` | Max records per poll cycle |
//! | `BW_HEALTH_PORT` | `9090` | Health endpoint port |
//! | `RUST_LOG` | `info` | Log level |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bw_outbox::{HttpDispatcherConfig, HttpNotificationDispatcher, OutboxProcessor, StoreOutboxRepository};
use bw_store::MemoryStore;

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable is required", key))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("starting Briefwork outbox processor");

    let sink_url = env_required("BW_SINK_URL")?;
    let signing_secret = std::env::var("BW_SIGNING_SECRET").ok();
    let poll_interval_ms: u64 = env_or_parse("BW_POLL_INTERVAL_MS", 1000);
    let batch_size: u32 = env_or_parse("BW_BATCH_SIZE", 100);
    let health_port: u16 = env_or_parse("BW_HEALTH_PORT", 9090);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Dev wiring: the in-memory store. Production deployments point the
    // repository at the shared document database.
    let store = Arc::new(MemoryStore::new());
    let repository = Arc::new(StoreOutboxRepository::new(store));

    let dispatcher = Arc::new(HttpNotificationDispatcher::new(HttpDispatcherConfig {
        sink_url: sink_url.clone(),
        signing_secret,
        connect_timeout: Duration::from_secs(10),
        request_timeout: Duration::from_secs(30),
    })?);
    info!("notification sink: {}", sink_url);

    let processor = OutboxProcessor::new(
        repository,
        dispatcher,
        Duration::from_millis(poll_interval_ms),
        batch_size,
    );

    let processor_handle = {
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = processor.start() => {}
                _ = shutdown_rx.recv() => {
                    info!("outbox processor shutting down");
                }
            }
        })
    };

    let health_addr = SocketAddr::from(([0, 0, 0, 0], health_port));
    info!("health endpoint on http://{}/health", health_addr);

    let health_app = axum::Router::new().route("/health", axum::routing::get(health_handler));
    let health_listener = tokio::net::TcpListener::bind(health_addr).await?;
    let health_handle = {
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            axum::serve(health_listener, health_app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .ok();
        })
    };

    shutdown_signal().await;
    info!("shutdown signal received...");

    let _ = shutdown_tx.send(());
    let _ = tokio::time::timeout(Duration::from_secs(30), async {
        let _ = processor_handle.await;
        let _ = health_handle.await;
    })
    .await;

    info!("Briefwork outbox processor shutdown complete");
    Ok(())
}

async fn health_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
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
