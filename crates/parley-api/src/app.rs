//! Application builder — wires collaborators, the real-time engine and the
//! router into an Axum app.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;

use parley_core::config::AppConfig;
use parley_core::error::AppError;
use parley_directory::MemoryDirectory;
use parley_realtime::{Collaborators, RealtimeEngine};

use crate::auth::JwtIdentityService;
use crate::router::build_router;
use crate::state::AppState;

/// Builds shared state: directory, token verifier and real-time engine.
pub fn build_state(config: AppConfig) -> AppState {
    let directory = Arc::new(MemoryDirectory::from_config(&config.directory));
    let identity = Arc::new(JwtIdentityService::new(&config.auth));

    let collaborators = Collaborators {
        identity,
        membership: directory.clone(),
        messages: directory.clone(),
        channels: directory,
    };

    let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), collaborators));

    AppState {
        config: Arc::new(config),
        realtime,
        started_at: Instant::now(),
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the Parley server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Parley server...");

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = build_state(config);
    let realtime = state.realtime.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Parley server listening on {}", addr);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            return match joined {
                Ok(result) => result.map_err(|e| AppError::internal(format!("Server error: {e}"))),
                Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
            };
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        }
    }

    realtime.shutdown();
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(result)) => result.map_err(|e| AppError::internal(format!("Server error: {e}")))?,
        Ok(Err(e)) => return Err(AppError::internal(format!("Server task failed: {e}"))),
        Err(_) => tracing::warn!(
            grace_seconds = grace.as_secs(),
            "Graceful shutdown timed out"
        ),
    }

    tracing::info!("Parley server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
