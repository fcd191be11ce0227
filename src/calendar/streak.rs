use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use utoipa::ToSchema;

use super::window::{days_between, MonthKey};
use crate::models::DiaryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
    /// Percent of elapsed days in the month that have a diary, 0..=100
    pub month_progress: u32,
    pub days_with_diary: u32,
    pub days_passed: u32,
}

/// Writing streaks over a subject's full diary history, plus progress for `month`.
pub fn writing_streak(diaries: &[DiaryRecord], month: MonthKey, today: NaiveDate) -> StreakSummary {
    let dates: BTreeSet<NaiveDate> = diaries.iter().map(|d| d.date).collect();

    let days_with_diary = dates.iter().filter(|d| month.contains(**d)).count() as u32;
    let days_passed = if month == MonthKey::from_date(today) {
        today.day()
    } else {
        month.days()
    };

    StreakSummary {
        current: current_streak(&dates, today),
        longest: longest_streak(&dates),
        month_progress: progress_percent(days_with_diary, days_passed),
        days_with_diary,
        days_passed,
    }
}

/// Consecutive days ending exactly at `today`. Zero when nothing was written today,
/// however long the run up to yesterday is.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0u32;
    for date in dates.iter().rev() {
        if days_between(*date, today) == i64::from(streak) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

pub fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for date in dates {
        run = match prev {
            Some(p) if days_between(p, *date) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*date);
    }

    longest
}

fn progress_percent(done: u32, passed: u32) -> u32 {
    if passed == 0 {
        return 0;
    }
    let percent = (100.0 * f64::from(done) / f64::from(passed)).round() as u32;
    percent.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::access::fixtures::*;

    fn diaries(days: &[&str]) -> Vec<DiaryRecord> {
        days.iter()
            .enumerate()
            .map(|(i, day)| diary(i as u128 + 1, day, None))
            .collect()
    }

    fn june() -> MonthKey {
        "2024-06".parse().unwrap()
    }

    #[test]
    fn test_streak_ending_today() {
        let summary = writing_streak(
            &diaries(&["2024-06-10", "2024-06-11", "2024-06-12"]),
            june(),
            date("2024-06-12"),
        );

        assert_eq!(summary.current, 3);
        assert_eq!(summary.longest, 3);
    }

    #[test]
    fn test_no_entry_today_means_no_current_streak() {
        let summary = writing_streak(
            &diaries(&["2024-06-10", "2024-06-11"]),
            june(),
            date("2024-06-12"),
        );

        assert_eq!(summary.current, 0);
        assert_eq!(summary.longest, 2);
    }

    #[test]
    fn test_duplicate_dates_count_once() {
        let summary = writing_streak(
            &diaries(&["2024-06-11", "2024-06-12", "2024-06-12", "2024-06-11"]),
            june(),
            date("2024-06-12"),
        );

        assert_eq!(summary.current, 2);
        assert_eq!(summary.longest, 2);
        assert_eq!(summary.days_with_diary, 2);
    }

    #[test]
    fn test_future_entry_breaks_current_streak() {
        let summary = writing_streak(
            &diaries(&["2024-06-12", "2024-06-14"]),
            june(),
            date("2024-06-12"),
        );

        assert_eq!(summary.current, 0);
    }

    #[test]
    fn test_longest_takes_max_over_gaps() {
        let summary = writing_streak(
            &diaries(&[
                "2024-05-01", "2024-05-02", "2024-05-03", "2024-05-04",
                "2024-05-10",
                "2024-06-11", "2024-06-12",
            ]),
            june(),
            date("2024-06-12"),
        );

        assert_eq!(summary.current, 2);
        assert_eq!(summary.longest, 4);
    }

    #[test]
    fn test_longest_never_below_current() {
        let histories: [&[&str]; 4] = [
            &["2024-06-12"],
            &["2024-06-01", "2024-06-11", "2024-06-12"],
            &["2024-05-30", "2024-05-31", "2024-06-01"],
            &["2024-06-09", "2024-06-10", "2024-06-11", "2024-06-12"],
        ];
        for history in histories {
            let summary = writing_streak(&diaries(history), june(), date("2024-06-12"));
            assert!(summary.longest >= summary.current, "{history:?}");
        }
    }

    #[test]
    fn test_progress_for_current_month_uses_elapsed_days() {
        let summary = writing_streak(
            &diaries(&["2024-06-01", "2024-06-05", "2024-06-09", "2024-05-31"]),
            june(),
            date("2024-06-12"),
        );

        assert_eq!(summary.days_passed, 12);
        assert_eq!(summary.days_with_diary, 3);
        assert_eq!(summary.month_progress, 25);
    }

    #[test]
    fn test_progress_for_past_month_uses_whole_month() {
        let may: MonthKey = "2024-05".parse().unwrap();
        let summary = writing_streak(
            &diaries(&["2024-05-01", "2024-05-02"]),
            may,
            date("2024-06-12"),
        );

        assert_eq!(summary.days_passed, 31);
        assert_eq!(summary.month_progress, 6);
    }

    #[test]
    fn test_progress_is_capped_when_future_days_are_filled() {
        let summary = writing_streak(
            &diaries(&["2024-06-01", "2024-06-02", "2024-06-20"]),
            june(),
            date("2024-06-02"),
        );

        assert_eq!(summary.month_progress, 100);
    }

    #[test]
    fn test_progress_zero_when_no_days_passed() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(5, 0), 0);
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let summary = writing_streak(&[], june(), date("2024-06-12"));

        assert_eq!(summary.current, 0);
        assert_eq!(summary.longest, 0);
        assert_eq!(summary.month_progress, 0);
    }
}
