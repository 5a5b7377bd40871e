use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{get_link, get_links, health},
    state::AppState,
};
use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::fetcher::HttpFetcher;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the API router over an already assembled state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/v1/links", get(get_links))
        .route("/v1/link/{id}", get(get_link))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let fetcher = HttpFetcher::new(&config.fetcher)?;

    let registry = config.registry();
    info!(targets = registry.count(), "Target registry loaded");

    let aggregator = Aggregator::new(registry, Arc::new(fetcher))
        .with_max_parallelism(config.aggregator.max_parallelism);

    let shutdown = CancellationToken::new();
    let address = config.server.bind_addr();
    let state = AppState::new(aggregator, shutdown.clone());

    let listener = TcpListener::bind(address).await?;
    info!(%address, "linkcount API listening");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    // Abandon in-flight fetches so draining requests finish promptly
    shutdown.cancel();
}
