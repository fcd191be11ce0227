use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    response::Html,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    extractors::{USER_ID_HEADER, USER_ROLE_HEADER},
    handlers,
    middleware::{metrics_middleware, request_id_middleware, require_debug_key},
    openapi::ApiDoc,
};

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            cors
        }
    }
}

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    // Insight routes
    let insight_routes = Router::new()
        .route("/diary", get(handlers::insights_handler::get_diary_insights))
        .route("/health", get(handlers::insights_handler::get_health_insights));

    // Schedule routes
    let schedule_routes = Router::new()
        .route("/", post(handlers::schedules_handler::create_schedule))
        .route(
            "/{id}",
            put(handlers::schedules_handler::update_schedule)
                .delete(handlers::schedules_handler::delete_schedule),
        )
        .route("/{id}/complete", post(handlers::schedules_handler::complete_schedule))
        .route("/{id}/cancel", post(handlers::schedules_handler::cancel_schedule));

    // Debug routes, gated by X-Debug-Key
    let debug_routes = Router::new()
        .route("/debug", get(handlers::debug::debug_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_debug_key));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .merge(debug_routes)
        .route("/api/calendar", get(handlers::calendar_handler::get_calendar))
        .nest("/api/insights", insight_routes)
        .nest("/api/schedules", schedule_routes)
        .route("/api/connections", get(handlers::connections_handler::get_connections))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/swagger-ui", get(swagger_ui))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

async fn swagger_ui() -> Html<&'static str> {
    Html(r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CareCal API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: '/api-docs/openapi.json',
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
    "#)
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{send, state};
    use crate::upstream::fake::FakeCareApi;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_and_docs_are_public() {
        let app = super::build_router(state(Arc::new(FakeCareApi::default())));

        let (status, body) = send(app.clone(), "GET", "/health", None, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(app, "GET", "/api-docs/openapi.json", None, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["info"]["title"], "CareCal API");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = super::build_router(state(Arc::new(FakeCareApi::default())));
        let (status, _) = send(app, "GET", "/api/shifts", None, None).await;
        assert_eq!(status, 404);
    }
}
