use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::schedule::{Category, CreatorType, RecurringType, ScheduleRecord};

/// Input for creating a schedule
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateScheduleInput {
    pub elderly_id: Option<Uuid>, // Defaults to the acting elderly user
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub due_date: NaiveDate,
    #[schema(example = "08:30")]
    pub due_time: Option<String>,
    #[serde(default)]
    pub is_shared_with_caregiver: bool,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_type: Option<RecurringType>,
    pub recurring_days: Option<Vec<u8>>,
    pub recurring_day_of_month: Option<u32>,
    pub creator_type: Option<CreatorType>, // Will be set from the acting user's role
}

/// Input for updating a schedule. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateScheduleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_shared_with_caregiver: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_type: Option<RecurringType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_days: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_day_of_month: Option<u32>,
}

/// Response for schedule mutations
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleMutationResponse {
    pub success: bool,
    #[schema(value_type = Option<Object>)]
    pub schedule: Option<ScheduleRecord>,
    pub message: Option<String>,
}
