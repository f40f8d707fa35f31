pub mod handlers;
pub mod types;

use crate::{
    Result,
    config::Config,
    provider::{InferenceProvider, create_provider},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::post,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

/// Builds the router around an already constructed provider. OPTIONS is
/// answered by the CORS layer; every other response gets the origin header
/// from it as well. Bodies larger than `max_body_bytes` are refused with 413.
pub fn router(provider: Arc<dyn InferenceProvider>, max_body_bytes: usize) -> Router {
    let app_state = handlers::AppState { provider };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE);

    Router::new()
        .route(
            "/",
            post(handlers::describe).fallback(handlers::method_not_allowed),
        )
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: Config) -> Result<()> {
    let provider = create_provider(&config.provider)?;
    let app = router(provider, config.server.max_body_bytes);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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

    info!("Shutdown signal received");
}
