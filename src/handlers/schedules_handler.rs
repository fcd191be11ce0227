use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    calendar::access,
    models::{
        schedule::hhmm, ActingUser, CreateScheduleInput, CreatorType, Recurrence, Role,
        ScheduleMutationResponse, ScheduleRecord, UpdateScheduleInput,
    },
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteScheduleQuery {
    #[serde(rename = "deleteAllRecurring", default)]
    pub delete_all_recurring: bool,
}

fn validate_time(raw: Option<&str>) -> AppResult<()> {
    match raw {
        Some(raw) => hhmm::parse(raw)
            .map(|_| ())
            .map_err(|e| AppError::Validation(format!("Invalid due_time '{}': {}", raw, e))),
        None => Ok(()),
    }
}

fn validate_recurrence(
    is_recurring: bool,
    input_type: Option<crate::models::RecurringType>,
    days: Option<&[u8]>,
    day_of_month: Option<u32>,
) -> AppResult<()> {
    Recurrence::from_parts(is_recurring, input_type, days, day_of_month)
        .map(|_| ())
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// Loads the schedule and checks `allowed` for the acting user
async fn authorize(
    state: &AppState,
    user: &ActingUser,
    id: Uuid,
    action: &str,
    allowed: fn(&ScheduleRecord, &ActingUser) -> bool,
) -> AppResult<ScheduleRecord> {
    let record = state.care_api.get_schedule(user, id).await?;
    if !allowed(&record, user) {
        tracing::warn!(user_id = %user.id, schedule_id = %id, action, "Schedule action denied");
        return Err(AppError::Forbidden(format!("Not allowed to {} this schedule", action)));
    }
    Ok(record)
}

fn mutated(schedule: ScheduleRecord, message: &str) -> Json<ScheduleMutationResponse> {
    Json(ScheduleMutationResponse {
        success: true,
        schedule: Some(schedule),
        message: Some(message.to_string()),
    })
}

/// POST /api/schedules - Create a schedule for the acting elder or a connected elder
#[utoipa::path(
    post,
    path = "/api/schedules",
    request_body = CreateScheduleInput,
    responses(
        (status = 200, description = "Schedule created successfully", body = ScheduleMutationResponse),
        (status = 403, description = "Elderly user is not connected to the caller"),
        (status = 422, description = "Invalid time or recurrence")
    ),
    tag = "schedules"
)]
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    user: ActingUser,
    Json(mut input): Json<CreateScheduleInput>,
) -> AppResult<Json<ScheduleMutationResponse>> {
    validate_time(input.due_time.as_deref())?;
    validate_recurrence(
        input.is_recurring,
        input.recurring_type,
        input.recurring_days.as_deref(),
        input.recurring_day_of_month,
    )?;

    // Creator is always the acting user
    input.creator_type = Some(match user.role {
        Role::Elderly => CreatorType::Elderly,
        Role::Caregiver => CreatorType::Caregiver,
        Role::Unrecognized => return Err(AppError::Forbidden("Unrecognized role".to_string())),
    });
    input.elderly_id = Some(
        state
            .roster
            .resolve_subject(state.care_api.as_ref(), &user, input.elderly_id)
            .await?,
    );

    let schedule = state.care_api.create_schedule(&user, &input).await?;
    tracing::info!(user_id = %user.id, schedule_id = %schedule.id, "Schedule created");

    Ok(mutated(schedule, "Schedule created successfully"))
}

/// PUT /api/schedules/{id}
#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    params(
        ("id" = Uuid, Path, description = "Schedule ID")
    ),
    request_body = UpdateScheduleInput,
    responses(
        (status = 200, description = "Schedule updated successfully", body = ScheduleMutationResponse),
        (status = 403, description = "Caller may not modify this schedule"),
        (status = 404, description = "Schedule not found")
    ),
    tag = "schedules"
)]
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: ActingUser,
    Json(input): Json<UpdateScheduleInput>,
) -> AppResult<Json<ScheduleMutationResponse>> {
    validate_time(input.due_time.as_deref())?;

    let current = authorize(&state, &user, id, "modify", access::can_modify).await?;

    // Validate the recurrence the schedule will end up with
    let current_wire = crate::models::schedule::ScheduleWire::from(current);
    validate_recurrence(
        input.is_recurring.unwrap_or(current_wire.is_recurring),
        input.recurring_type.or(current_wire.recurring_type),
        input.recurring_days.as_deref().or(current_wire.recurring_days.as_deref()),
        input.recurring_day_of_month.or(current_wire.recurring_day_of_month),
    )?;

    let schedule = state.care_api.update_schedule(&user, id, &input).await?;
    tracing::info!(user_id = %user.id, schedule_id = %id, "Schedule updated");

    Ok(mutated(schedule, "Schedule updated successfully"))
}

/// DELETE /api/schedules/{id}?deleteAllRecurring=
#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    params(
        ("id" = Uuid, Path, description = "Schedule ID"),
        DeleteScheduleQuery
    ),
    responses(
        (status = 200, description = "Schedule deleted successfully", body = ScheduleMutationResponse),
        (status = 403, description = "Caller may not delete this schedule"),
        (status = 404, description = "Schedule not found")
    ),
    tag = "schedules"
)]
pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteScheduleQuery>,
    user: ActingUser,
) -> AppResult<Json<ScheduleMutationResponse>> {
    authorize(&state, &user, id, "delete", access::can_delete).await?;

    state
        .care_api
        .delete_schedule(&user, id, query.delete_all_recurring)
        .await?;
    tracing::info!(
        user_id = %user.id, schedule_id = %id, all_recurring = query.delete_all_recurring,
        "Schedule deleted"
    );

    Ok(Json(ScheduleMutationResponse {
        success: true,
        schedule: None,
        message: Some("Schedule deleted successfully".to_string()),
    }))
}

/// POST /api/schedules/{id}/complete
#[utoipa::path(
    post,
    path = "/api/schedules/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule marked completed", body = ScheduleMutationResponse),
        (status = 403, description = "Caller may not complete this schedule")
    ),
    tag = "schedules"
)]
pub async fn complete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: ActingUser,
) -> AppResult<Json<ScheduleMutationResponse>> {
    authorize(&state, &user, id, "complete", access::can_complete).await?;

    let schedule = state.care_api.complete_schedule(&user, id).await?;
    Ok(mutated(schedule, "Schedule completed"))
}

/// POST /api/schedules/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/schedules/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule marked cancelled", body = ScheduleMutationResponse),
        (status = 403, description = "Caller may not cancel this schedule")
    ),
    tag = "schedules"
)]
pub async fn cancel_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: ActingUser,
) -> AppResult<Json<ScheduleMutationResponse>> {
    authorize(&state, &user, id, "cancel", access::can_complete).await?;

    let schedule = state.care_api.cancel_schedule(&user, id).await?;
    Ok(mutated(schedule, "Schedule cancelled"))
}
