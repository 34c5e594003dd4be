//! CRM RS Server
//!
//! HTTP server binary: configuration, logging, storage selection and the
//! API router.

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_api::AppState;
use crm_auth::MemoryIdentityProvider;
use crm_core::config::AppConfig;
use crm_db::{Database, DatabaseConfig};
use crm_services::{ServiceSettings, Services, Stores};

mod health;

use health::{HealthChecker, HealthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        day_boundary = %config.work_time.day_boundary(),
        "Starting CRM RS"
    );

    let db = match Database::connect(&DatabaseConfig::from(&config.database)).await {
        Ok(db) => {
            info!("Connected to database");
            Some(db)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to database, using in-memory stores");
            None
        }
    };

    let mut health = HealthChecker::new(HealthConfig::default());
    let stores = match db {
        Some(ref db) => {
            health = health.with_database(db.clone());
            Stores::postgres(db)
        }
        None => Stores::memory(),
    };

    let services = Services::new(
        stores,
        Arc::new(MemoryIdentityProvider::new()),
        ServiceSettings::from(&config),
    );
    let state = AppState::new(services, config.auth.user_header.as_str());

    let app = build_router(state, Arc::new(health));

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,crm_server=debug,crm_api=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

fn build_router(state: AppState, health: Arc<HealthChecker>) -> Router {
    // Health check routes (no user header required)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(crm_api::router().with_state(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = AppConfig::default();
        let services = Services::new(
            Stores::memory(),
            Arc::new(MemoryIdentityProvider::new()),
            ServiceSettings::from(&config),
        );
        let state = AppState::new(services, config.auth.user_header.as_str());
        build_router(state, Arc::new(HealthChecker::new(HealthConfig::default())))
    }

    async fn status_of(uri: &str) -> StatusCode {
        test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
        assert_eq!(status_of("/health/live").await, StatusCode::OK);
        assert_eq!(status_of("/health/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_root() {
        assert_eq!(status_of("/api").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_user() {
        assert_eq!(status_of("/api/clients").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        assert_eq!(status_of("/nowhere").await, StatusCode::NOT_FOUND);
    }
}
