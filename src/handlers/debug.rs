use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

use crate::AppState;

#[derive(Serialize)]
pub struct DebugInfo {
    pub version: String,
    pub git_sha: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub care_api_url: String,
    pub care_api_timeout_secs: u64,
    pub roster_cache_entries: u64,
    pub timestamp: u64,
}

/// Global start time for uptime calculation
static START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Touch the start time so uptime counts from boot, not the first /debug call
pub fn mark_started() {
    once_cell::sync::Lazy::force(&START_TIME);
}

/// Handler for the /debug endpoint
pub async fn debug_handler(State(state): State<Arc<AppState>>) -> Json<DebugInfo> {
    let uptime = START_TIME.elapsed().unwrap_or_default().as_secs();

    let info = DebugInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_sha: option_env!("GIT_SHA").unwrap_or("unknown").to_string(),
        environment: std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string()),
        uptime_seconds: uptime,
        care_api_url: state.config.care_api_url.clone(),
        care_api_timeout_secs: state.config.care_api_timeout_secs,
        roster_cache_entries: state.roster.entry_count(),
        timestamp: SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    };

    Json(info)
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::state;
    use crate::upstream::fake::FakeCareApi;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn status_with_key(key: Option<&str>) -> u16 {
        let app = crate::startup::build_router(state(Arc::new(FakeCareApi::default())));
        let mut request = Request::builder().uri("/debug");
        if let Some(key) = key {
            request = request.header("X-Debug-Key", key);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        response.status().as_u16()
    }

    #[tokio::test]
    async fn test_debug_requires_key() {
        assert_eq!(status_with_key(None).await, 401);
        assert_eq!(status_with_key(Some("wrong")).await, 401);
        assert_eq!(status_with_key(Some("letmein")).await, 200);
    }
}
