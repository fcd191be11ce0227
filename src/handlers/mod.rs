pub mod calendar_handler;
pub mod connections_handler;
pub mod debug;
pub mod health;
pub mod insights_handler;
pub mod metrics;
pub mod schedules_handler;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};

use chrono::NaiveDate;

use crate::{AppError, AppResult};

/// `YYYY-MM-DD` query parameter, or the server's local date when absent
pub(crate) fn date_or_today(raw: Option<&str>, name: &str) -> AppResult<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", name, e))),
        None => Ok(chrono::Local::now().date_naive()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_or_today() {
        assert_eq!(
            date_or_today(Some("2024-06-15"), "date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
        assert_eq!(date_or_today(None, "date").unwrap(), chrono::Local::now().date_naive());
        assert!(matches!(date_or_today(Some("15/06/2024"), "date"), Err(AppError::BadRequest(_))));
    }
}
