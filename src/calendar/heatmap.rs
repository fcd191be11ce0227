use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use super::window::MonthKey;
use crate::models::{DiaryRecord, Mood};

/// Color for a day whose diary carries no mood
pub const NO_MOOD_COLOR: &str = "#D9D9D9";

const WEEK_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HeatmapCell {
    pub day: u32,
    pub date: NaiveDate,
    pub has_diary: bool,
    pub mood: Option<Mood>,
    #[schema(value_type = Option<String>, example = "#FFD93D")]
    pub color: Option<&'static str>,
    pub is_future: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Heatmap {
    #[schema(value_type = String, example = "2024-06")]
    pub month: MonthKey,
    /// Rows of seven days starting at day 1, not aligned to weekdays
    pub weeks: Vec<Vec<HeatmapCell>>,
    pub days_with_diary: u32,
}

/// Mood grid for one month. Diaries outside `month` are ignored.
///
/// When a day has several diaries the one with the latest `created_at` wins; entries
/// without a timestamp lose to timestamped ones, and among equals the later one in
/// input order wins.
pub fn build_heatmap(month: MonthKey, diaries: &[DiaryRecord], today: NaiveDate) -> Heatmap {
    let mut by_day: HashMap<u32, &DiaryRecord> = HashMap::new();
    for diary in diaries.iter().filter(|d| month.contains(d.date)) {
        by_day
            .entry(diary.date.day())
            .and_modify(|current| {
                if diary.created_at >= current.created_at {
                    *current = diary;
                }
            })
            .or_insert(diary);
    }

    let is_current_month = month == MonthKey::from_date(today);

    let cells: Vec<HeatmapCell> = (1..=month.days())
        .filter_map(|day| {
            let date = month.day(day)?;
            let diary = by_day.get(&day);
            let mood = diary.and_then(|d| d.mood);

            Some(HeatmapCell {
                day,
                date,
                has_diary: diary.is_some(),
                mood,
                color: diary.map(|_| mood.map_or(NO_MOOD_COLOR, Mood::color)),
                is_future: is_current_month && day > today.day(),
            })
        })
        .collect();

    Heatmap {
        month,
        weeks: cells.chunks(WEEK_LEN).map(<[HeatmapCell]>::to_vec).collect(),
        days_with_diary: by_day.len() as u32,
    }
}
