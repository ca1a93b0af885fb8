mod app;
mod config;
mod handlers;
mod models;
mod service;
mod state;
mod store;
mod style;

use bridge_common::{bind_listener, init_tracing, shutdown_signal};
use std::{net::SocketAddr, process::ExitCode};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::store::EventStore;

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::from_env();
    let _guards = init_tracing(&config.logging);

    tracing::info!(service = config.logging.service_name.as_str(), "starting");
    if config.logging.debug {
        tracing::info!(log_dir = %config.logging.log_dir.display(), "debug logging is enabled");
    }

    // Schema must exist before the first request; failure here is fatal.
    let store = EventStore::new(&config.database_path);
    tracing::info!(path = %store.path().display(), "initializing database");
    if let Err(err) = store.initialize().await {
        tracing::error!(error = %err, "database initialization failed");
        return ExitCode::FAILURE;
    }
    tracing::info!("database initialization successful");

    let app = app::build_router(AppState::new(store));
    let listener = match bind_listener(config.port).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(port = config.port, error = %err, "bind listener failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(port = config.port, "listening");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;
    if let Err(err) = served {
        tracing::error!(error = %err, "server error");
        return ExitCode::FAILURE;
    }

    tracing::info!(service = config.logging.service_name.as_str(), "shutting down");
    ExitCode::SUCCESS
}
