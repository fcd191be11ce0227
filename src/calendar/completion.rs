//! Per-category completion status for the health dashboard.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::window::days_between;
use crate::models::{Category, DetailedStats, ScheduleRecord, ScheduleStatus};

const MEDICINE_ALERT_BELOW: f64 = 0.80;
const EXERCISE_ALERT_BELOW: f64 = 0.70;
const MEAL_ALERT_BELOW: f64 = 0.85;

const MEDICINE_GOOD_FROM: f64 = 0.90;
const MEAL_GOOD_FROM: f64 = 0.85;
const EXERCISE_GOOD_FROM: f64 = 0.80;
const OVERALL_GOOD_FROM: f64 = 0.85;

/// Appointments further out than this are labelled with their date
const RELATIVE_LABEL_MAX_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CountStatus {
    pub completed: u32,
    pub total: u32,
    /// `completed/total`
    pub display: String,
}

impl CountStatus {
    fn new(completed: u32, total: u32) -> Self {
        Self { completed, total, display: format!("{completed}/{total}") }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStatus {
    None,
    Completed,
    NotCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UpcomingAppointment {
    pub id: Uuid,
    pub title: String,
    pub due_date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub due_time: Option<NaiveTime>,
    pub days_until: i64,
    /// "today", "tomorrow", "N days", or a month-day date past a week out
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TodayStatus {
    pub medicine: CountStatus,
    pub meal: CountStatus,
    pub exercise: ExerciseStatus,
    pub hospital: Option<UpcomingAppointment>,
}

/// Today's dashboard tiles. Cancelled schedules don't count towards totals.
pub fn today_status(schedules: &[ScheduleRecord], today: NaiveDate) -> TodayStatus {
    let count = |category: Category| {
        let (completed, total) = schedules
            .iter()
            .filter(|s| s.category == category && s.due_date == today && !s.is_cancelled())
            .fold((0u32, 0u32), |(done, all), s| (done + u32::from(s.is_completed()), all + 1));
        CountStatus::new(completed, total)
    };

    let exercise = match count(Category::Exercise) {
        CountStatus { total: 0, .. } => ExerciseStatus::None,
        CountStatus { completed, total, .. } if completed == total => ExerciseStatus::Completed,
        _ => ExerciseStatus::NotCompleted,
    };

    TodayStatus {
        medicine: count(Category::Medicine),
        meal: count(Category::Meal),
        exercise,
        hospital: upcoming_appointment(schedules, today),
    }
}

/// Nearest pending hospital visit on or after `today`; untimed visits sort as midnight.
pub fn upcoming_appointment(schedules: &[ScheduleRecord], today: NaiveDate) -> Option<UpcomingAppointment> {
    schedules
        .iter()
        .filter(|s| {
            s.category == Category::Hospital
                && s.status == ScheduleStatus::Pending
                && s.due_date >= today
        })
        .min_by_key(|s| (s.due_date, s.due_time.unwrap_or(NaiveTime::MIN)))
        .map(|s| {
            let days_until = days_between(today, s.due_date);
            UpcomingAppointment {
                id: s.id,
                title: s.title.clone(),
                due_date: s.due_date,
                due_time: s.due_time,
                days_until,
                label: relative_label(s.due_date, days_until),
            }
        })
}

fn relative_label(date: NaiveDate, days_until: i64) -> String {
    match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n if n <= RELATIVE_LABEL_MAX_DAYS => format!("{n} days"),
        _ => date.format("%b %-d").to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryRatio {
    pub category: Category,
    pub completed: u32,
    pub total: u32,
    /// `completed / total`, absent when nothing was scheduled
    pub ratio: Option<f64>,
}

fn ratio(completed: u32, total: u32) -> Option<f64> {
    (total > 0).then(|| f64::from(completed) / f64::from(total))
}

/// Month-to-date ratios for the tracked categories, read from the API's period summary.
pub fn category_ratios(stats: &DetailedStats) -> Vec<CategoryRatio> {
    Category::TRACKED
        .iter()
        .map(|&category| {
            let (completed, total) = stats
                .category(category)
                .map_or((0, 0), |c| (c.completed, c.total));
            CategoryRatio { category, completed, total, ratio: ratio(completed, total) }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HealthNote {
    /// None for the overall note
    pub category: Option<Category>,
    pub rate: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
pub struct HealthReport {
    pub alerts: Vec<HealthNote>,
    pub recommendations: Vec<HealthNote>,
    pub strengths: Vec<HealthNote>,
}

struct Thresholds {
    alert_below: f64,
    good_from: f64,
    alert: &'static str,
    recommendation: &'static str,
    strength: &'static str,
}

fn thresholds(category: Category) -> Option<Thresholds> {
    match category {
        Category::Medicine => Some(Thresholds {
            alert_below: MEDICINE_ALERT_BELOW,
            good_from: MEDICINE_GOOD_FROM,
            alert: "Medication is often being missed",
            recommendation: "Set a reminder alarm at each medication time",
            strength: "Medication is taken regularly",
        }),
        Category::Exercise => Some(Thresholds {
            alert_below: EXERCISE_ALERT_BELOW,
            good_from: EXERCISE_GOOD_FROM,
            alert: "Exercise sessions are often skipped",
            recommendation: "Try a short daily walk or light stretching",
            strength: "Exercise routine is well kept",
        }),
        Category::Meal => Some(Thresholds {
            alert_below: MEAL_ALERT_BELOW,
            good_from: MEAL_GOOD_FROM,
            alert: "Meals are being skipped",
            recommendation: "Keep regular meal times and check in at mealtimes",
            strength: "Meals are eaten on schedule",
        }),
        Category::Hospital | Category::Other => None,
    }
}

/// Alerts, recommendations and good-status notes for a statistics period.
/// Categories with nothing scheduled produce nothing; an empty period produces an empty report.
pub fn health_report(stats: &DetailedStats) -> HealthReport {
    let mut report = HealthReport::default();
    let Some(overall) = ratio(stats.completed, stats.total) else {
        return report;
    };

    for entry in category_ratios(stats) {
        let (Some(rate), Some(t)) = (entry.ratio, thresholds(entry.category)) else {
            continue;
        };
        let note = |message: &str| HealthNote {
            category: Some(entry.category),
            rate,
            message: message.to_string(),
        };

        if rate < t.alert_below {
            report.alerts.push(note(t.alert));
            report.recommendations.push(note(t.recommendation));
        }
        if rate >= t.good_from {
            report.strengths.push(note(t.strength));
        }
    }

    if overall >= OVERALL_GOOD_FROM {
        report.strengths.push(HealthNote {
            category: None,
            rate: overall,
            message: "Overall schedule completion is excellent".to_string(),
        });
    }

    report
}
