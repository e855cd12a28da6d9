//! HTTP surface: `GET /api/health`, `POST|OPTIONS /api/submit`

pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
pub mod state;
pub mod upsert;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::error::Result;
use config::ServerConfig;
use routes::{health_handler, method_not_allowed_handler, preflight_handler, submit_handler};
use state::AppState;

pub use upsert::{upsert_submission, CloseFailure, UpsertOutcome};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 16 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/submit",
            post(submit_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(config: ServerConfig) -> Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::from_config(config)?);

    let listener = TcpListener::bind(&address).await?;
    log::info!("Listening on {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
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
