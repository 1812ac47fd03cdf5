//! HTTP API routes and handlers.
//!
//! Endpoint implementations organized by domain:
//! - `attendance` - marking, broadcast sessions, history, edits
//! - `geofence` - dual-factor presence verification
//! - `health` - service health checks
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::SharedState;

pub mod attendance;
pub mod error;
pub mod geofence;
pub mod health;
pub mod openapi;

// Re-export commonly used types
#[allow(unused_imports)]
pub use error::{ApiError, ApiResult, ErrorResponse};

// Re-export OpenAPI utilities for the gen-openapi binary
#[allow(unused_imports)]
pub use openapi::get_openapi_json;

/// Creates the combined API router with all endpoints.
///
/// # Route Structure
///
/// ```text
/// /health                                   - Health check
/// /docs                                     - Swagger UI
/// /api
/// ├── /classes/{id}/attendance              - History, marking, broadcasts
/// ├── /geofence/check/{class_id}            - Dual-factor verification
/// └── /openapi.json                         - OpenAPI specification
/// ```
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest(
            "/api",
            Router::new()
                .route("/openapi.json", get(openapi::get_openapi_spec))
                .nest("/classes/{id}/attendance", attendance::router())
                .nest("/geofence", geofence::router()),
        )
        .merge(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
