use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::AppState;

pub const DEBUG_KEY_HEADER: &str = "X-Debug-Key";

/// Middleware that requires a valid X-Debug-Key header.
/// With no DEBUG_KEY configured the endpoint is closed.
pub async fn require_debug_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected_key = state
        .config
        .debug_key
        .as_deref()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let provided_key = request
        .headers()
        .get(DEBUG_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Constant-time comparison
    if expected_key.as_bytes().ct_eq(provided_key.as_bytes()).into() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Unauthorized debug endpoint access attempt");
        Err(StatusCode::UNAUTHORIZED)
    }
}
