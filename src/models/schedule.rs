use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Who wrote a schedule or diary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CreatorType {
    Elderly,
    Caregiver,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Medicine,
    Hospital,
    Exercise,
    Meal,
    Other,
}

impl Category {
    /// Categories tracked by the health dashboard
    pub const TRACKED: [Category; 4] = [
        Category::Medicine,
        Category::Hospital,
        Category::Exercise,
        Category::Meal,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecurringType {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    #[error("recurring schedule is missing recurring_type")]
    MissingType,

    #[error("weekly recurrence needs at least one day")]
    NoWeekdays,

    #[error("weekday index {0} is outside 0..=6")]
    InvalidWeekday(u8),

    #[error("monthly recurrence needs recurring_day_of_month")]
    MissingDayOfMonth,

    #[error("day of month {0} is outside 1..=31")]
    InvalidDayOfMonth(u32),
}

/// Repeat rule for a schedule. Weekly days are kept sorted Sunday-first and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    None,
    Daily,
    Weekly { days: Vec<Weekday> },
    Monthly { day_of_month: u32 },
}

impl Recurrence {
    pub fn weekly(indices: &[u8]) -> Result<Self, RecurrenceError> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        if sorted.is_empty() {
            return Err(RecurrenceError::NoWeekdays);
        }

        let days = sorted
            .into_iter()
            .map(weekday_from_index)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Recurrence::Weekly { days })
    }

    pub fn monthly(day_of_month: u32) -> Result<Self, RecurrenceError> {
        if !(1..=31).contains(&day_of_month) {
            return Err(RecurrenceError::InvalidDayOfMonth(day_of_month));
        }
        Ok(Recurrence::Monthly { day_of_month })
    }

    /// Build from the flat wire fields. Extra fields are ignored when `is_recurring` is false.
    pub fn from_parts(
        is_recurring: bool,
        recurring_type: Option<RecurringType>,
        recurring_days: Option<&[u8]>,
        recurring_day_of_month: Option<u32>,
    ) -> Result<Self, RecurrenceError> {
        if !is_recurring {
            return Ok(Recurrence::None);
        }

        match recurring_type.ok_or(RecurrenceError::MissingType)? {
            RecurringType::Daily => Ok(Recurrence::Daily),
            RecurringType::Weekly => Recurrence::weekly(recurring_days.unwrap_or_default()),
            RecurringType::Monthly => {
                Recurrence::monthly(recurring_day_of_month.ok_or(RecurrenceError::MissingDayOfMonth)?)
            }
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }

    fn recurring_type(&self) -> Option<RecurringType> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some(RecurringType::Daily),
            Recurrence::Weekly { .. } => Some(RecurringType::Weekly),
            Recurrence::Monthly { .. } => Some(RecurringType::Monthly),
        }
    }

    fn day_indices(&self) -> Option<Vec<u8>> {
        match self {
            Recurrence::Weekly { days } => Some(
                days.iter()
                    .map(|d| d.num_days_from_sunday() as u8)
                    .collect(),
            ),
            _ => None,
        }
    }

    fn day_of_month(&self) -> Option<u32> {
        match self {
            Recurrence::Monthly { day_of_month } => Some(*day_of_month),
            _ => None,
        }
    }
}

fn weekday_from_index(index: u8) -> Result<Weekday, RecurrenceError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(RecurrenceError::InvalidWeekday(other)),
    }
}

/// A dated task or appointment ("todo") owned by one elderly user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleWire", into = "ScheduleWire")]
pub struct ScheduleRecord {
    pub id: Uuid,
    pub elderly_id: Uuid,
    pub creator_id: Uuid,
    pub creator_type: CreatorType,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub due_date: NaiveDate,
    pub due_time: Option<NaiveTime>,
    pub status: ScheduleStatus,
    pub is_shared_with_caregiver: bool,
    pub recurrence: Recurrence,
    pub created_at: Option<DateTime<Utc>>,
}

impl ScheduleRecord {
    pub fn is_completed(&self) -> bool {
        self.status == ScheduleStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ScheduleStatus::Cancelled
    }
}

/// Flat JSON shape of a schedule as the care API sends it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleWire {
    pub id: Uuid,
    pub elderly_id: Uuid,
    pub creator_id: Uuid,
    pub creator_type: CreatorType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    pub due_date: NaiveDate,
    #[serde(default, with = "hhmm::option")]
    #[schema(value_type = Option<String>, example = "08:30")]
    pub due_time: Option<NaiveTime>,
    pub status: ScheduleStatus,
    #[serde(default)]
    pub is_shared_with_caregiver: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_type: Option<RecurringType>,
    #[serde(default)]
    pub recurring_days: Option<Vec<u8>>,
    #[serde(default)]
    pub recurring_day_of_month: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<ScheduleWire> for ScheduleRecord {
    type Error = RecurrenceError;

    fn try_from(wire: ScheduleWire) -> Result<Self, Self::Error> {
        let recurrence = Recurrence::from_parts(
            wire.is_recurring,
            wire.recurring_type,
            wire.recurring_days.as_deref(),
            wire.recurring_day_of_month,
        )?;

        Ok(Self {
            id: wire.id,
            elderly_id: wire.elderly_id,
            creator_id: wire.creator_id,
            creator_type: wire.creator_type,
            title: wire.title,
            description: wire.description,
            category: wire.category,
            due_date: wire.due_date,
            due_time: wire.due_time,
            status: wire.status,
            is_shared_with_caregiver: wire.is_shared_with_caregiver,
            recurrence,
            created_at: wire.created_at,
        })
    }
}

impl From<ScheduleRecord> for ScheduleWire {
    fn from(record: ScheduleRecord) -> Self {
        Self {
            id: record.id,
            elderly_id: record.elderly_id,
            creator_id: record.creator_id,
            creator_type: record.creator_type,
            title: record.title,
            description: record.description,
            category: record.category,
            due_date: record.due_date,
            due_time: record.due_time,
            status: record.status,
            is_shared_with_caregiver: record.is_shared_with_caregiver,
            is_recurring: record.recurrence.is_recurring(),
            recurring_type: record.recurrence.recurring_type(),
            recurring_days: record.recurrence.day_indices(),
            recurring_day_of_month: record.recurrence.day_of_month(),
            created_at: record.created_at,
        }
    }
}

/// `HH:MM` times. Seconds are accepted on input and dropped on output.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(time) => serializer.serialize_some(&time.format("%H:%M").to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => parse(s).map(Some).map_err(serde::de::Error::custom),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_json() -> serde_json::Value {
        json!({
            "id": "6f1c2f4e-0a59-4f3a-9d55-0c43d1e7a001",
            "elderly_id": "6f1c2f4e-0a59-4f3a-9d55-0c43d1e7a002",
            "creator_id": "6f1c2f4e-0a59-4f3a-9d55-0c43d1e7a002",
            "creator_type": "elderly",
            "title": "Blood pressure pill",
            "category": "MEDICINE",
            "due_date": "2024-06-15",
            "due_time": "08:30:00",
            "status": "pending",
            "is_shared_with_caregiver": true
        })
    }

    #[test]
    fn test_parses_non_recurring_schedule() {
        let record: ScheduleRecord = serde_json::from_value(wire_json()).unwrap();

        assert_eq!(record.category, Category::Medicine);
        assert_eq!(record.due_time, NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(record.recurrence, Recurrence::None);
    }

    #[test]
    fn test_weekly_days_are_sorted_and_deduplicated() {
        let mut value = wire_json();
        value["is_recurring"] = json!(true);
        value["recurring_type"] = json!("weekly");
        value["recurring_days"] = json!([5, 1, 1]);

        let record: ScheduleRecord = serde_json::from_value(value).unwrap();

        assert_eq!(
            record.recurrence,
            Recurrence::Weekly { days: vec![Weekday::Mon, Weekday::Fri] }
        );
    }

    #[test]
    fn test_weekly_without_days_is_rejected() {
        let mut value = wire_json();
        value["is_recurring"] = json!(true);
        value["recurring_type"] = json!("weekly");
        value["recurring_days"] = json!([]);

        assert!(serde_json::from_value::<ScheduleRecord>(value).is_err());
    }

    #[test]
    fn test_monthly_day_out_of_range_is_rejected() {
        assert_eq!(Recurrence::monthly(32), Err(RecurrenceError::InvalidDayOfMonth(32)));
        assert_eq!(Recurrence::monthly(0), Err(RecurrenceError::InvalidDayOfMonth(0)));
        assert!(Recurrence::monthly(31).is_ok());
    }

    #[test]
    fn test_recurrence_fields_ignored_when_not_recurring() {
        let recurrence = Recurrence::from_parts(false, Some(RecurringType::Weekly), Some(&[]), None);
        assert_eq!(recurrence, Ok(Recurrence::None));
    }

    #[test]
    fn test_serializes_back_to_flat_wire_shape() {
        let mut value = wire_json();
        value["is_recurring"] = json!(true);
        value["recurring_type"] = json!("monthly");
        value["recurring_day_of_month"] = json!(15);

        let record: ScheduleRecord = serde_json::from_value(value).unwrap();
        let out = serde_json::to_value(&record).unwrap();

        assert_eq!(out["due_time"], "08:30");
        assert_eq!(out["recurring_type"], "monthly");
        assert_eq!(out["recurring_day_of_month"], 15);
        assert_eq!(out["recurring_days"], serde_json::Value::Null);
    }
}
