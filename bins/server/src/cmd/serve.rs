use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{ServeArgs, ServerConfig, StorageKind};
use crate::error::ServerError;
use storage_memory::MemoryStorage;
use storage_sqlite::SqliteStorage;
use yoink_api::YoinkStorage;
use yoink_api_server::AppState;

/// Open the configured backend and create its schema. Runs once, before
/// anything is served.
async fn open_storage(config: &ServerConfig) -> Result<Arc<dyn YoinkStorage>, ServerError> {
    let storage: Arc<dyn YoinkStorage> = match config.storage {
        StorageKind::Sqlite => Arc::new(SqliteStorage::open(&config.db_path)?),
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
    };
    storage.init().await?;
    Ok(storage)
}

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("datayoinker starting");

    // --- Load config ---
    let config = ServerConfig::resolve(&args)?;
    tracing::info!(
        port = config.port,
        storage = ?config.storage,
        db_path = %config.db_path,
        "loaded config"
    );

    // --- Storage: no storage, no traffic ---
    let storage = open_storage(&config).await?;
    tracing::info!(storage = ?config.storage, "storage ready");

    serve_until(&config, storage, tokio::signal::ctrl_c()).await
}

/// Serve until `stop` resolves or the server exits on its own, then drain
/// and close `storage`. Storage is closed on every path.
async fn serve_until(
    config: &ServerConfig,
    storage: Arc<dyn YoinkStorage>,
    stop: impl Future<Output = std::io::Result<()>>,
) -> Result<(), ServerError> {
    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- API server ---
    let state = AppState::new(storage.clone());
    let api_port = config.port;
    let request_timeout = Duration::from_secs(config.request_timeout_secs);
    let api_token = token.clone();
    let mut api_handle = tokio::spawn(async move {
        yoink_api_server::run(api_port, state, request_timeout, api_token).await
    });

    tracing::info!("server ready");

    // --- Wait for the stop signal, or for the server to die on its own ---
    let mut signal_error = None;
    let early_exit = tokio::select! {
        signal = stop => {
            match signal {
                Ok(()) => tracing::info!("shutting down..."),
                Err(e) => {
                    tracing::error!(error = %e, "signal handler failed, shutting down");
                    signal_error = Some(e);
                }
            }
            None
        }
        joined = &mut api_handle => Some(joined),
    };

    let served = match early_exit {
        Some(joined) => joined,
        None => {
            token.cancel();
            let grace = Duration::from_secs(config.shutdown_grace_secs);
            match tokio::time::timeout(grace, &mut api_handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(grace_secs = config.shutdown_grace_secs, "drain timed out, aborting api server");
                    api_handle.abort();
                    Ok(Ok(()))
                }
            }
        }
    };

    if let Err(e) = storage.close().await {
        tracing::error!(error = %e, "storage close error");
    }

    if let Some(e) = signal_error {
        return Err(ServerError::Signal(e));
    }
    match served {
        Ok(Ok(())) => {
            tracing::info!("shutdown complete");
            Ok(())
        }
        Ok(Err(e)) => Err(ServerError::Api(e)),
        Err(e) => Err(ServerError::Api(format!("api task: {e}"))),
    }
}
