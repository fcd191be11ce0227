use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    calendar::{
        access, build_heatmap, category_ratios, health_report, today_status, writing_streak,
        CategoryRatio, HealthReport, Heatmap, MonthKey, StreakSummary, TodayStatus,
    },
    models::{ActingUser, StatsPeriod},
    upstream::{list_all_diaries, DiaryQuery, ScheduleQuery},
    AppError, AppResult, AppState,
};

/// How far ahead to look for the next hospital appointment. Visits further out
/// than a year are reported as none.
const APPOINTMENT_LOOKAHEAD_DAYS: i64 = 365;

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetDiaryInsightsQuery {
    /// `YYYY-MM`, defaults to the current month
    pub month: Option<String>,
    #[serde(rename = "elderlyId")]
    pub elderly_id: Option<Uuid>,
    /// Overrides the server date, `YYYY-MM-DD`
    pub today: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiaryInsightsResponse {
    pub elderly_id: Uuid,
    pub streak: StreakSummary,
    pub heatmap: Heatmap,
}

/// GET /api/insights/diary?month=&elderlyId=
#[utoipa::path(
    get,
    path = "/api/insights/diary",
    params(GetDiaryInsightsQuery),
    responses(
        (status = 200, description = "Writing streaks and the mood heatmap for a month", body = DiaryInsightsResponse),
        (status = 400, description = "Invalid month or date")
    ),
    tag = "insights"
)]
pub async fn get_diary_insights(
    State(state): State<Arc<AppState>>,
    user: ActingUser,
    Query(query): Query<GetDiaryInsightsQuery>,
) -> AppResult<Json<DiaryInsightsResponse>> {
    let today = super::date_or_today(query.today.as_deref(), "today")?;
    let month = match query.month.as_deref() {
        Some(raw) => raw
            .parse::<MonthKey>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => MonthKey::from_date(today),
    };

    let elderly_id = state
        .roster
        .resolve_subject(state.care_api.as_ref(), &user, query.elderly_id)
        .await?;

    // Streaks need the whole history, not just the month
    let diary_query = DiaryQuery {
        elderly_id: Some(elderly_id),
        ..DiaryQuery::default()
    };
    let diaries: Vec<_> = list_all_diaries(state.care_api.as_ref(), &user, diary_query, state.config.diary_page_size)
        .await?
        .into_iter()
        .filter(|d| access::diary_visible(d, &user))
        .collect();

    let streak = writing_streak(&diaries, month, today);
    let heatmap = build_heatmap(month, &diaries, today);

    tracing::debug!(
        %elderly_id, %month, current = streak.current, longest = streak.longest,
        "Diary insights computed"
    );

    Ok(Json(DiaryInsightsResponse { elderly_id, streak, heatmap }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetHealthInsightsQuery {
    pub period: Option<StatsPeriod>,
    #[serde(rename = "elderlyId")]
    pub elderly_id: Option<Uuid>,
    /// Overrides the server date, `YYYY-MM-DD`
    pub today: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthInsightsResponse {
    pub elderly_id: Uuid,
    pub date: NaiveDate,
    pub period: StatsPeriod,
    pub today: TodayStatus,
    pub categories: Vec<CategoryRatio>,
    pub report: HealthReport,
}

/// GET /api/insights/health?period=&elderlyId=
#[utoipa::path(
    get,
    path = "/api/insights/health",
    params(GetHealthInsightsQuery),
    responses(
        (status = 200, description = "Today's category status, period completion ratios and health notes", body = HealthInsightsResponse),
        (status = 400, description = "Invalid date")
    ),
    tag = "insights"
)]
pub async fn get_health_insights(
    State(state): State<Arc<AppState>>,
    user: ActingUser,
    Query(query): Query<GetHealthInsightsQuery>,
) -> AppResult<Json<HealthInsightsResponse>> {
    let today = super::date_or_today(query.today.as_deref(), "today")?;
    let period = query.period.unwrap_or_default();

    let elderly_id = state
        .roster
        .resolve_subject(state.care_api.as_ref(), &user, query.elderly_id)
        .await?;

    let schedule_query = ScheduleQuery {
        elderly_id: Some(elderly_id),
        start_date: Some(today),
        end_date: today.checked_add_signed(Duration::days(APPOINTMENT_LOOKAHEAD_DAYS)),
    };
    let (schedules, stats) = tokio::try_join!(
        state.care_api.list_schedules(&user, &schedule_query),
        state.care_api.get_detailed_stats(&user, period, Some(elderly_id)),
    )?;

    let schedules: Vec<_> = schedules
        .into_iter()
        .filter(|s| access::is_visible(s, &user))
        .collect();

    let report = health_report(&stats);
    tracing::debug!(
        %elderly_id, period = period.as_str(), alerts = report.alerts.len(),
        "Health insights computed"
    );

    Ok(Json(HealthInsightsResponse {
        elderly_id,
        date: today,
        period,
        today: today_status(&schedules, today),
        categories: category_ratios(&stats),
        report,
    }))
}
