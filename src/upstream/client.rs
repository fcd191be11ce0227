use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::{CareDataSource, DiaryQuery, ScheduleQuery};
use crate::{
    models::{
        schedule::ScheduleWire, ActingUser, ConnectedElderly, Connection, CreateScheduleInput,
        DetailedStats, DiaryRecord, RecurrenceError, ScheduleRecord, StatsPeriod,
        UpdateScheduleInput,
    },
    AppError, AppResult,
};

/// reqwest-backed client for the care REST API
#[derive(Clone)]
pub struct HttpCareApi {
    client: Client,
    base_url: String,
}

impl HttpCareApi {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, user: &ActingUser) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json");

        match &user.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, endpoint: &'static str, request: RequestBuilder) -> AppResult<reqwest::Response> {
        let start = Instant::now();
        let result = request.send().await;
        histogram!("care_api_request_duration_seconds", "endpoint" => endpoint)
            .record(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            tracing::error!(error = %e, endpoint, "Care API request failed");
            counter!("care_api_requests_total", "endpoint" => endpoint, "outcome" => "unreachable").increment(1);
            AppError::Unavailable(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, endpoint, body, "Care API returned error");
            counter!("care_api_requests_total", "endpoint" => endpoint, "outcome" => "error").increment(1);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                detail: error_detail(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        counter!("care_api_requests_total", "endpoint" => endpoint, "outcome" => "ok").increment(1);
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &'static str, request: RequestBuilder) -> AppResult<T> {
        let response = self.execute(endpoint, request).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!(error = %e, endpoint, "Failed to parse care API response");
            AppError::Unavailable(e)
        })
    }
}

/// Pull a human-readable message out of an error body (`{"detail": ...}` or `{"message": ...}`)
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed: Option<serde_json::Value> = serde_json::from_str(trimmed).ok();
    let message = parsed.as_ref().and_then(|v| {
        ["detail", "message", "error"]
            .iter()
            .find_map(|key| v.get(key))
            .map(|m| match m.as_str() {
                Some(s) => s.to_string(),
                None => m.to_string(),
            })
    });

    Some(message.unwrap_or_else(|| trimmed.to_string()))
}

/// Converts each listed schedule on its own. A record with an invalid recurrence is
/// dropped and logged; the rest of the list is kept.
fn valid_schedules(wires: Vec<ScheduleWire>) -> Vec<ScheduleRecord> {
    wires
        .into_iter()
        .filter_map(|wire| {
            let id = wire.id;
            ScheduleRecord::try_from(wire)
                .map_err(|e: RecurrenceError| {
                    tracing::warn!(schedule_id = %id, error = %e, "Dropping malformed schedule from care API");
                    counter!("care_api_malformed_records_total", "endpoint" => "list_schedules").increment(1);
                })
                .ok()
        })
        .collect()
}

#[async_trait]
impl CareDataSource for HttpCareApi {
    async fn list_schedules(&self, user: &ActingUser, query: &ScheduleQuery) -> AppResult<Vec<ScheduleRecord>> {
        let request = self.request(Method::GET, "/api/todos", user).query(query);
        let wires: Vec<ScheduleWire> = self.fetch("list_schedules", request).await?;
        let received = wires.len();
        let schedules = valid_schedules(wires);
        tracing::debug!(count = schedules.len(), received, start = ?query.start_date, end = ?query.end_date, "Fetched schedules");
        Ok(schedules)
    }

    async fn list_diaries(&self, user: &ActingUser, query: &DiaryQuery) -> AppResult<Vec<DiaryRecord>> {
        let request = self.request(Method::GET, "/api/diaries", user).query(query);
        self.fetch("list_diaries", request).await
    }

    async fn get_schedule(&self, user: &ActingUser, id: Uuid) -> AppResult<ScheduleRecord> {
        let request = self.request(Method::GET, &format!("/api/todos/{}", id), user);
        self.fetch("get_schedule", request).await
    }

    async fn create_schedule(&self, user: &ActingUser, input: &CreateScheduleInput) -> AppResult<ScheduleRecord> {
        let request = self.request(Method::POST, "/api/todos", user).json(input);
        self.fetch("create_schedule", request).await
    }

    async fn update_schedule(
        &self,
        user: &ActingUser,
        id: Uuid,
        input: &UpdateScheduleInput,
    ) -> AppResult<ScheduleRecord> {
        let request = self.request(Method::PUT, &format!("/api/todos/{}", id), user).json(input);
        self.fetch("update_schedule", request).await
    }

    async fn delete_schedule(&self, user: &ActingUser, id: Uuid, delete_all_recurring: bool) -> AppResult<()> {
        let request = self
            .request(Method::DELETE, &format!("/api/todos/{}", id), user)
            .query(&[("delete_all_recurring", delete_all_recurring)]);
        self.execute("delete_schedule", request).await?;
        Ok(())
    }

    async fn complete_schedule(&self, user: &ActingUser, id: Uuid) -> AppResult<ScheduleRecord> {
        let request = self.request(Method::POST, &format!("/api/todos/{}/complete", id), user);
        self.fetch("complete_schedule", request).await
    }

    async fn cancel_schedule(&self, user: &ActingUser, id: Uuid) -> AppResult<ScheduleRecord> {
        let request = self.request(Method::POST, &format!("/api/todos/{}/cancel", id), user);
        self.fetch("cancel_schedule", request).await
    }

    async fn get_detailed_stats(
        &self,
        user: &ActingUser,
        period: StatsPeriod,
        elderly_id: Option<Uuid>,
    ) -> AppResult<DetailedStats> {
        let mut request = self
            .request(Method::GET, "/api/todos/stats/detailed", user)
            .query(&[("period", period.as_str())]);
        if let Some(elderly_id) = elderly_id {
            request = request.query(&[("elderly_id", elderly_id)]);
        }
        self.fetch("get_detailed_stats", request).await
    }

    async fn get_connected_elderly(&self, user: &ActingUser) -> AppResult<Vec<ConnectedElderly>> {
        let request = self.request(Method::GET, "/api/users/connected-elderly", user);
        self.fetch("get_connected_elderly", request).await
    }

    async fn get_connections(&self, user: &ActingUser) -> AppResult<Vec<Connection>> {
        let request = self.request(Method::GET, "/api/users/connections", user);
        self.fetch("get_connections", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        routing::{delete, get, post},
        Json, Router,
    };
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const ELDER: Uuid = Uuid::from_u128(0xE1);

    fn todo_json(id: u128, due: &str) -> Value {
        json!({
            "id": Uuid::from_u128(id),
            "elderly_id": ELDER,
            "creator_id": ELDER,
            "creator_type": "elderly",
            "title": "Morning walk",
            "category": "EXERCISE",
            "due_date": due,
            "due_time": "07:00",
            "status": "pending",
            "is_shared_with_caregiver": false,
            "is_recurring": true,
            "recurring_type": "weekly",
            "recurring_days": [1, 3, 5]
        })
    }

    async fn list_todos(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer elder-token") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})));
        }
        let echo_start = params.get("start_date").cloned().unwrap_or_default();
        let mut broken = todo_json(2, &echo_start);
        broken["recurring_days"] = Value::Null;
        (StatusCode::OK, Json(json!([todo_json(1, &echo_start), broken])))
    }

    async fn complete_todo(Path(id): Path<Uuid>) -> (StatusCode, Json<Value>) {
        if id == Uuid::from_u128(404) {
            return (StatusCode::NOT_FOUND, Json(json!({"detail": "Todo not found"})));
        }
        let mut todo = todo_json(id.as_u128(), "2024-06-15");
        todo["status"] = json!("completed");
        (StatusCode::OK, Json(todo))
    }

    async fn delete_todo(Query(params): Query<HashMap<String, String>>) -> StatusCode {
        match params.get("delete_all_recurring").map(String::as_str) {
            Some("true") => StatusCode::NO_CONTENT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    async fn mock_care_api() -> HttpCareApi {
        let app = Router::new()
            .route("/api/todos", get(list_todos))
            .route("/api/todos/{id}/complete", post(complete_todo))
            .route("/api/todos/{id}", delete(delete_todo))
            .route(
                "/api/todos/stats/detailed",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database exploded") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HttpCareApi::new(&format!("http://{}/", addr), Duration::from_secs(5)).unwrap()
    }

    fn elder(token: Option<&str>) -> ActingUser {
        ActingUser {
            bearer_token: token.map(str::to_string),
            ..ActingUser::new(ELDER, Role::Elderly)
        }
    }

    #[tokio::test]
    async fn test_lists_schedules_with_query_and_token() {
        let api = mock_care_api().await;
        let query = ScheduleQuery {
            elderly_id: Some(ELDER),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 6),
        };

        let schedules = api.list_schedules(&elder(Some("elder-token")), &query).await.unwrap();

        // The weekly todo without days is dropped, the valid one survives
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].id, Uuid::from_u128(1));
        assert_eq!(schedules[0].due_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(schedules[0].recurrence.is_recurring());
    }

    #[tokio::test]
    async fn test_upstream_error_detail_is_kept() {
        let api = mock_care_api().await;

        let err = api
            .list_schedules(&elder(None), &ScheduleQuery::default())
            .await
            .unwrap_err();

        match err {
            AppError::Upstream { status, detail } => {
                assert_eq!(status, 401);
                assert_eq!(detail, "Not authenticated");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_used_verbatim() {
        let api = mock_care_api().await;

        let err = api
            .get_detailed_stats(&elder(Some("elder-token")), StatsPeriod::Month, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream { status: 500, ref detail } if detail == "database exploded"));
    }

    #[tokio::test]
    async fn test_complete_and_not_found() {
        let api = mock_care_api().await;
        let user = elder(Some("elder-token"));

        let done = api.complete_schedule(&user, Uuid::from_u128(7)).await.unwrap();
        assert!(done.is_completed());

        let missing = api.complete_schedule(&user, Uuid::from_u128(404)).await.unwrap_err();
        assert!(matches!(missing, AppError::Upstream { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_delete_sends_recurring_flag() {
        let api = mock_care_api().await;

        api.delete_schedule(&elder(None), Uuid::from_u128(7), true).await.unwrap();
        assert!(api.delete_schedule(&elder(None), Uuid::from_u128(7), false).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let api = HttpCareApi::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let err = api.get_connections(&elder(None)).await.unwrap_err();

        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[test]
    fn test_malformed_schedules_are_dropped_individually() {
        let mut monthly = todo_json(3, "2024-06-15");
        monthly["recurring_type"] = json!("monthly");
        monthly["recurring_day_of_month"] = json!(40);
        let mut no_days = todo_json(2, "2024-06-15");
        no_days["recurring_days"] = Value::Null;

        let wires: Vec<ScheduleWire> =
            serde_json::from_value(json!([todo_json(1, "2024-06-15"), no_days, monthly, todo_json(4, "2024-06-16")]))
                .unwrap();
        let ids: Vec<_> = valid_schedules(wires).into_iter().map(|s| s.id.as_u128()).collect();

        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(error_detail(r#"{"detail":"Forbidden"}"#).as_deref(), Some("Forbidden"));
        assert_eq!(error_detail(r#"{"message":"Bad"}"#).as_deref(), Some("Bad"));
        assert_eq!(
            error_detail(r#"{"detail":[{"loc":["body"]}]}"#).as_deref(),
            Some(r#"[{"loc":["body"]}]"#)
        );
        assert_eq!(error_detail("oops").as_deref(), Some("oops"));
        assert_eq!(error_detail("  "), None);
    }
}
