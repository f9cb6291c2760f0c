//! Router configuration.
//!
//! This module creates the main Axum router that combines the health probes
//! and the resource API.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::get,
};
use roster_catalog::Catalog;
use roster_core::Config;
use roster_rest::{ApiState, LinkBuilder, resource_router};
use roster_storage::Repository;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Creates the main application router over `repository`.
///
/// Resources are mounted under `config.server.base_path`; health probes stay
/// at the root.
pub fn create_router<S>(config: &Config, repository: Arc<S>, catalog: Arc<Catalog>) -> Router
where
    S: Repository + 'static,
{
    let state = ApiState::new(
        repository,
        catalog,
        LinkBuilder::new(&config.server.base_url, &config.server.base_path),
        config.paging,
    );

    // Create health check routes
    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check::<S>))
        .with_state(state.clone());

    let resources = resource_router::<S>().with_state(state);

    let app = if config.server.base_path.is_empty() {
        Router::new().merge(resources)
    } else {
        Router::new().nest(&config.server.base_path, resources)
    };

    app.merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Basic health check.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        error: None,
    })
}

/// Kubernetes liveness probe.
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe: the storage engine must answer.
async fn readiness_check<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.repository.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready",
                version: None,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    version: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
