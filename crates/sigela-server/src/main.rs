//! Entry point for the sigela-server binary.

use std::sync::Arc;

use sigela_server::{
    AppState, app,
    auth::hash_password,
    config::{LogFormat, ServerConfig, StoreBackend},
};
use sigela_store::{MemoryStore, PgStore, StoreConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    tracing::info!("Starting sigela-server");
    tracing::info!(?config, "Configuration loaded");

    let addr = config.socket_addr();

    match config.store_backend {
        StoreBackend::Postgres => {
            // The pool is created on the first request that needs it.
            let store = Arc::new(PgStore::new(StoreConfig::from_env()?));
            serve(AppState::new(store.clone(), config), addr).await?;
            store.close().await;
        }
        StoreBackend::Memory => {
            let password = config.demo_password.clone().unwrap_or_default();
            let store = Arc::new(MemoryStore::new());
            store.seed_demo(&hash_password(&password)?).await;
            tracing::warn!("Running on the in-memory store with demo identities");
            serve(AppState::new(store, config), addr).await?;
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn serve(
    state: AppState,
    addr: std::net::SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = app(state)?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Initialize the tracing subscriber.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
