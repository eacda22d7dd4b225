//! Todo board API server.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address or host name (default `0.0.0.0`)
//! - `PORT`: bind port (default `4000`)
//! - `STORE_MODE`: `in_memory` (default) | `redis`
//! - `REDIS_URL`: Redis connection URL (default `redis://127.0.0.1:6379`)
//! - `KEY_STRATEGY`: `legacy` (default) | `uuid`
//! - `RUST_LOG`: log filter (default `todo_board=debug,tower_http=debug`)

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_board::api::{AppState, create_router};
use todo_board::infrastructure::{ServiceConfig, StartupError, StoreFactory};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_board=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(error) = run().await {
        tracing::error!(%error, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    tracing::info!("Starting todo board API");

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        store_mode = ?config.store_mode,
        key_strategy = ?config.key_strategy,
        "Configuration loaded"
    );

    let address = config.bind_address()?;
    let store = StoreFactory::new(config.clone()).create().await?;
    let application = create_router(AppState::new(store.clone(), config.key_strategy));

    let listener = TcpListener::bind(address)
        .await
        .map_err(|error| StartupError::Bind {
            address: address.to_string(),
            reason: error.to_string(),
        })?;

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    let served = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(error) = store.close().await {
        tracing::warn!(%error, "Failed to close store");
    }

    served.map_err(|error| StartupError::Serve(error.to_string()))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Completes when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
