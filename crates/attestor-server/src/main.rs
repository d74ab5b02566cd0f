//! Attestor Server Binary
//!
//! Runs the attestation HTTP server.

use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use attestor_server::{create_router, AppState, AttestationStore, MemoryStore, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config).await?;

    info!(
        addr = %config.addr(),
        recent_limit = config.recent_limit,
        "Starting attestor server"
    );

    let state = Arc::new(AppState::new(store).with_recent_limit(config.recent_limit));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;

    info!(addr = %config.addr(), "Attestor listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "postgres")]
async fn open_store(
    config: &ServerConfig,
) -> Result<Arc<dyn AttestationStore>, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(attestor_server::PostgresStore::new(url).await?)),
        None => {
            warn!("DATABASE_URL not set, attestations will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(
    config: &ServerConfig,
) -> Result<Arc<dyn AttestationStore>, Box<dyn std::error::Error>> {
    if config.database_url.is_some() {
        warn!("DATABASE_URL is set but this build has no postgres support, using memory store");
    } else {
        warn!("Using in-memory store, attestations will not survive a restart");
    }
    Ok(Arc::new(MemoryStore::new()))
}
