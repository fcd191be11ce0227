use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::filter::Record;
use super::window::MonthKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGroup {
    pub month: MonthKey,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupedRecords {
    /// `YYYY-MM-DD` → records on that day
    ByDay(BTreeMap<NaiveDate, Vec<Record>>),
    /// Newest month first
    ByMonth(Vec<MonthGroup>),
}

pub fn group_records(records: Vec<Record>, group_by: GroupBy) -> GroupedRecords {
    match group_by {
        GroupBy::Day => GroupedRecords::ByDay(group_by_day(records)),
        GroupBy::Month => GroupedRecords::ByMonth(group_by_month(records)),
    }
}

pub fn group_by_day(records: Vec<Record>) -> BTreeMap<NaiveDate, Vec<Record>> {
    let mut days: BTreeMap<NaiveDate, Vec<Record>> = BTreeMap::new();
    for record in records {
        days.entry(record.date()).or_default().push(record);
    }
    for bucket in days.values_mut() {
        bucket.sort_by(same_day_order);
    }
    days
}

pub fn group_by_month(records: Vec<Record>) -> Vec<MonthGroup> {
    let mut months: BTreeMap<MonthKey, Vec<Record>> = BTreeMap::new();
    for record in records {
        months
            .entry(MonthKey::from_date(record.date()))
            .or_default()
            .push(record);
    }

    months
        .into_iter()
        .rev()
        .map(|(month, mut records)| {
            records.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| same_day_order(a, b)));
            MonthGroup { month, records }
        })
        .collect()
}

/// Schedules before diaries; schedules by time with untimed last, diaries by creation.
fn same_day_order(a: &Record, b: &Record) -> Ordering {
    match (a, b) {
        (Record::Schedule(x), Record::Schedule(y)) => match (x.due_time, y.due_time) {
            (Some(tx), Some(ty)) => tx.cmp(&ty),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        (Record::Schedule(_), Record::Diary(_)) => Ordering::Less,
        (Record::Diary(_), Record::Schedule(_)) => Ordering::Greater,
        (Record::Diary(x), Record::Diary(y)) => x.created_at.cmp(&y.created_at),
    }
}
