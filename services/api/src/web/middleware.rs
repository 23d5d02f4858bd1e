//! services/api/src/web/middleware.rs
//!
//! Owner resolution for protected routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use planner_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::web::state::AppState;

/// Header carrying the caller's user id, set by the authenticating gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Middleware that resolves the requesting user from the `x-user-id` header.
///
/// If the user exists, the `User` is inserted into request extensions for handlers.
/// A missing, malformed, or unknown id returns 401 Unauthorized; a failed lookup
/// returns 500 without running the handler.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract and parse the user id header
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Look the user up so records are only ever fetched for a known owner
    let user = state.db.find_user(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => {
            warn!("Rejected request for unknown user {}", user_id);
            StatusCode::UNAUTHORIZED
        }
        PortError::Unexpected(_) => {
            error!("Failed to resolve user {}: {:?}", user_id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    })?;

    // 3. Insert the user into request extensions and continue to the handler
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
