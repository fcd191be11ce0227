use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    models::{ActingUser, Role},
    AppError,
};

/// Set by the auth gateway after it has validated the session
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw_id = header_str(parts, USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication: no X-User-Id header".to_string()))?;

        let id = Uuid::parse_str(raw_id).map_err(|e| {
            tracing::warn!(raw_id, error = %e, "Malformed X-User-Id header");
            AppError::Unauthorized(format!("Invalid X-User-Id: {}", e))
        })?;

        let role = header_str(parts, USER_ROLE_HEADER)
            .map(Role::parse)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication: no X-User-Role header".to_string()))?;

        // Forwarded to the care API as-is
        let bearer_token = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string());

        tracing::debug!(user_id = %id, role = ?role, "Acting user resolved");

        Ok(ActingUser { id, role, bearer_token })
    }
}
