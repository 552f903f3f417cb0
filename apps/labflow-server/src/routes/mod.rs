//! Route modules for LabFlow Server

pub mod health;
pub mod reports;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().server.max_upload_bytes;
    let cors = cors_layer(&state.config().server.cors_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .route("/api/processar-laudo", post(reports::extract_reports))
        .route("/api/v1/reports/extract", post(reports::extract_reports))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS layer for the configured origins.
///
/// An explicit origin list also allows credentials, which tower-http only
/// accepts with mirrored (not wildcard) methods and headers.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(list) => CorsLayer::new()
            .allow_origin(AllowOrigin::list(list.iter().filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| tracing::warn!("Ignoring invalid CORS origin: {}", origin))
                    .ok()
            })))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    }
}
