use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    calendar::{
        filter_records, group_records, resolve_window, CategoryFilter, DateWindow, GroupBy,
        GroupedRecords, RecordKind, ViewMode,
    },
    models::ActingUser,
    upstream::{list_all_diaries, DiaryQuery, ScheduleQuery},
    AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetCalendarQuery {
    /// Pivot date, defaults to today
    pub date: Option<String>,
    pub view: Option<ViewMode>,
    pub filter: Option<CategoryFilter>,
    #[serde(rename = "groupBy")]
    pub group_by: Option<GroupBy>,
    #[serde(rename = "elderlyId")]
    pub elderly_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarResponse {
    pub elderly_id: Uuid,
    pub pivot: NaiveDate,
    pub view: ViewMode,
    pub filter: CategoryFilter,
    pub schedule_window: Option<DateWindow>,
    pub diary_window: Option<DateWindow>,
    #[schema(value_type = Object)]
    pub records: GroupedRecords,
}

/// GET /api/calendar?date=&view=&filter=&groupBy=&elderlyId=
#[utoipa::path(
    get,
    path = "/api/calendar",
    params(GetCalendarQuery),
    responses(
        (status = 200, description = "Visible schedules and diaries around the pivot date, grouped", body = CalendarResponse),
        (status = 400, description = "Invalid date format"),
        (status = 403, description = "Elderly user is not connected to the caller")
    ),
    tag = "calendar"
)]
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    user: ActingUser,
    Query(query): Query<GetCalendarQuery>,
) -> AppResult<Json<CalendarResponse>> {
    let pivot = super::date_or_today(query.date.as_deref(), "date")?;
    let view = query.view.unwrap_or_default();
    let filter = query.filter.unwrap_or_default();
    let group_by = query.group_by.unwrap_or_default();

    let elderly_id = state
        .roster
        .resolve_subject(state.care_api.as_ref(), &user, query.elderly_id)
        .await?;

    let schedule_window = filter
        .wants_schedules()
        .then(|| resolve_window(pivot, view, RecordKind::Schedule));
    let diary_window = filter
        .wants_diaries()
        .then(|| resolve_window(pivot, view, RecordKind::Diary));

    tracing::debug!(
        %elderly_id, %pivot, ?view, ?filter, ?schedule_window, ?diary_window,
        "Fetching calendar records"
    );

    let schedules = async {
        match schedule_window {
            Some(window) => {
                let query = ScheduleQuery {
                    elderly_id: Some(elderly_id),
                    start_date: Some(window.start),
                    end_date: Some(window.end),
                };
                state.care_api.list_schedules(&user, &query).await
            }
            None => Ok(Vec::new()),
        }
    };
    let diaries = async {
        match diary_window {
            Some(window) => {
                let query = DiaryQuery {
                    elderly_id: Some(elderly_id),
                    start_date: Some(window.start),
                    end_date: Some(window.end),
                    ..DiaryQuery::default()
                };
                list_all_diaries(state.care_api.as_ref(), &user, query, state.config.diary_page_size).await
            }
            None => Ok(Vec::new()),
        }
    };
    let (mut schedules, mut diaries) = tokio::try_join!(schedules, diaries)?;

    // The care API's range filter is not trusted to be exact
    let received = schedules.len() + diaries.len();
    if let Some(window) = schedule_window {
        schedules.retain(|s| window.contains(s.due_date));
    }
    if let Some(window) = diary_window {
        diaries.retain(|d| window.contains(d.date));
    }
    let outside = received - schedules.len() - diaries.len();
    if outside > 0 {
        tracing::debug!(%elderly_id, outside, "Dropped records outside the fetch window");
    }

    let records = filter_records(schedules, diaries, filter, &user);
    tracing::debug!(%elderly_id, count = records.len(), "Calendar records visible");

    Ok(Json(CalendarResponse {
        elderly_id,
        pivot,
        view,
        filter,
        schedule_window,
        diary_window,
        records: group_records(records, group_by),
    }))
}

#[cfg(test)]
mod tests {
    use crate::calendar::access::fixtures::*;
    use crate::handlers::test_support::{send, state};
    use crate::models::{ConnectedElderly, CreatorType};
    use crate::upstream::fake::FakeCareApi;
    use std::sync::Arc;

    fn api() -> Arc<FakeCareApi> {
        let mut shared = schedule(1, CreatorType::Elderly, ELDER, "2024-06-15");
        shared.is_shared_with_caregiver = true;
        let private = schedule(2, CreatorType::Elderly, ELDER, "2024-06-15");
        let outside = schedule(3, CreatorType::Caregiver, CAREGIVER, "2024-08-20");

        Arc::new(FakeCareApi {
            schedules: vec![shared, private, outside],
            diaries: vec![diary(10, "2024-06-14", None), diary(11, "2024-03-01", None)],
            elderly: vec![ConnectedElderly { id: ELDER, name: "Grandma".into(), phone_number: None }],
            ..FakeCareApi::default()
        })
    }

    fn app(api: Arc<FakeCareApi>) -> axum::Router {
        crate::startup::build_router(state(api))
    }

    #[tokio::test]
    async fn test_elder_daily_calendar_groups_by_day() {
        let (status, body) = send(
            app(api()),
            "GET",
            "/api/calendar?date=2024-06-15",
            Some((ELDER, "elderly")),
            None,
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["schedule_window"]["start"], "2024-06-01");
        assert_eq!(body["schedule_window"]["end"], "2024-07-06");
        assert_eq!(body["diary_window"]["start"], "2024-05-16");
        assert_eq!(body["records"]["2024-06-15"].as_array().unwrap().len(), 2);
        assert_eq!(body["records"]["2024-06-14"][0]["kind"], "diary");
        assert!(body["records"].get("2024-08-20").is_none());
        assert!(body["records"].get("2024-03-01").is_none());
    }

    #[tokio::test]
    async fn test_caregiver_sees_only_shared_schedules() {
        let (status, body) = send(
            app(api()),
            "GET",
            "/api/calendar?date=2024-06-15&filter=schedule",
            Some((CAREGIVER, "caregiver")),
            None,
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["elderly_id"], ELDER.to_string());
        assert_eq!(body["diary_window"], serde_json::Value::Null);
        let day = body["records"]["2024-06-15"].as_array().unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0]["record"]["is_shared_with_caregiver"], true);
    }

    #[tokio::test]
    async fn test_diary_filter_skips_schedule_fetch() {
        let api = api();
        let (status, body) = send(
            app(api.clone()),
            "GET",
            "/api/calendar?date=2024-06-15&filter=diary&view=monthly&groupBy=month",
            Some((ELDER, "elderly")),
            None,
        )
        .await;

        assert_eq!(status, 200);
        assert!(!api.calls().iter().any(|c| c == "list_schedules"));
        assert_eq!(body["diary_window"]["start"], "2024-05-01");
        assert_eq!(body["diary_window"]["end"], "2024-07-31");
        assert_eq!(body["records"][0]["month"], "2024-06");
    }

    #[tokio::test]
    async fn test_records_outside_window_are_trimmed() {
        let api = Arc::new(FakeCareApi {
            schedules: vec![
                schedule(1, CreatorType::Elderly, ELDER, "2024-06-15"),
                schedule(2, CreatorType::Elderly, ELDER, "2024-09-30"),
            ],
            diaries: vec![diary(10, "2024-06-14", None), diary(11, "2023-01-01", None)],
            ignore_window: true,
            ..FakeCareApi::default()
        });

        let (status, body) = send(
            app(api),
            "GET",
            "/api/calendar?date=2024-06-15",
            Some((ELDER, "elderly")),
            None,
        )
        .await;

        assert_eq!(status, 200);
        let days: Vec<_> = body["records"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(days, vec!["2024-06-14", "2024-06-15"]);
    }

    #[tokio::test]
    async fn test_requires_identity() {
        let (status, _) = send(app(api()), "GET", "/api/calendar", None, None).await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_bad_pivot_date() {
        let (status, body) = send(
            app(api()),
            "GET",
            "/api/calendar?date=June",
            Some((ELDER, "elderly")),
            None,
        )
        .await;

        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid date"));
    }

    #[tokio::test]
    async fn test_caregiver_cannot_read_unconnected_elder() {
        let (status, _) = send(
            app(api()),
            "GET",
            &format!("/api/calendar?elderlyId={}", OTHER_CAREGIVER),
            Some((CAREGIVER, "caregiver")),
            None,
        )
        .await;

        assert_eq!(status, 403);
    }
}
