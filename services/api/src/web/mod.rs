pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_user;
pub use rest::{classes_today_handler, dashboard_handler, health_handler};

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::error::ApiError;
use state::AppState;

/// Builds the API router with the owner-resolving middleware on protected routes.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no user required)
    let public_routes = Router::new().route("/", get(health_handler));

    // Protected routes (user required)
    let protected_routes = Router::new()
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/classes/today", get(classes_today_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_user,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

/// CORS for the single configured web client: read-only methods plus the owner header.
pub fn cors_layer(config: &Config) -> Result<CorsLayer, ApiError> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::CorsOrigin {
            origin: config.cors_origin.clone(),
            reason: e.to_string(),
        })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(middleware::USER_ID_HEADER),
        ]))
}
