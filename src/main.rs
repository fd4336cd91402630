//! FileVault Server: versioned file storage with per-file sharing.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use filevault_auth::{IdentityResolver, JwtIdentityResolver};
use filevault_core::config::{AppConfig, DatabaseConfig};
use filevault_core::error::AppError;
use filevault_database::{DatabasePool, FileMetadataStore, InMemoryFileStore, PgMetadataStore};

/// `database.url` prefix selecting the in-process metadata store.
const MEMORY_DATABASE_PREFIX: &str = "memory:";

#[tokio::main]
async fn main() {
    let env = std::env::var("FILEVAULT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FileVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Metadata store ───────────────────────────────────
    let metadata = connect_metadata_store(&config.database).await?;

    // ── Step 2: Blob store ───────────────────────────────────────
    tracing::info!(provider = ?config.storage.provider, "Initializing blob store...");
    let blobs = filevault_storage::build_blob_store(&config.storage).await?;
    tracing::info!(provider = blobs.provider_type(), "Blob store initialized");

    // ── Step 3: Identity ─────────────────────────────────────────
    let identity: Arc<dyn IdentityResolver> = Arc::new(JwtIdentityResolver::new(&config.auth));

    // ── Step 4: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let state = filevault_api::AppState::new(config, metadata, blobs, identity);
    let app = filevault_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::configuration(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("FileVault server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("FileVault server shut down gracefully");
    Ok(())
}

async fn connect_metadata_store(
    config: &DatabaseConfig,
) -> Result<Arc<dyn FileMetadataStore>, AppError> {
    if config.url.starts_with(MEMORY_DATABASE_PREFIX) {
        tracing::warn!("Using in-memory metadata store; metadata is lost on restart");
        return Ok(Arc::new(InMemoryFileStore::new()));
    }

    tracing::info!("Connecting to database...");
    let pool = DatabasePool::connect(config).await?;

    if config.run_migrations {
        filevault_database::migration::run_migrations(pool.pool()).await?;
    }

    Ok(Arc::new(PgMetadataStore::new(pool.into_pool())))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
