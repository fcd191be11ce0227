use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::access;
use crate::models::{ActingUser, DiaryRecord, ScheduleRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Schedule,
    Diary,
}

impl CategoryFilter {
    pub fn wants_schedules(self) -> bool {
        matches!(self, CategoryFilter::All | CategoryFilter::Schedule)
    }

    pub fn wants_diaries(self) -> bool {
        matches!(self, CategoryFilter::All | CategoryFilter::Diary)
    }
}

/// One calendar entry of either kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Record {
    Schedule(ScheduleRecord),
    Diary(DiaryRecord),
}

impl Record {
    pub fn date(&self) -> NaiveDate {
        match self {
            Record::Schedule(s) => s.due_date,
            Record::Diary(d) => d.date,
        }
    }

    pub fn is_visible_to(&self, user: &ActingUser) -> bool {
        match self {
            Record::Schedule(s) => access::is_visible(s, user),
            Record::Diary(d) => access::diary_visible(d, user),
        }
    }
}

/// Drop the record kind the filter excludes, then everything the user may not see.
pub fn filter_records(
    schedules: Vec<ScheduleRecord>,
    diaries: Vec<DiaryRecord>,
    filter: CategoryFilter,
    user: &ActingUser,
) -> Vec<Record> {
    let schedules = schedules
        .into_iter()
        .filter(|_| filter.wants_schedules())
        .map(Record::Schedule);
    let diaries = diaries
        .into_iter()
        .filter(|_| filter.wants_diaries())
        .map(Record::Diary);

    schedules
        .chain(diaries)
        .filter(|record| record.is_visible_to(user))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::access::fixtures::*;
    use crate::models::{CreatorType, Role};

    fn input() -> (Vec<ScheduleRecord>, Vec<DiaryRecord>) {
        let mut shared = schedule(1, CreatorType::Elderly, ELDER, "2024-06-15");
        shared.is_shared_with_caregiver = true;
        let private = schedule(2, CreatorType::Elderly, ELDER, "2024-06-15");
        let by_caregiver = schedule(3, CreatorType::Caregiver, OTHER_CAREGIVER, "2024-06-16");

        (
            vec![shared, private, by_caregiver],
            vec![diary(10, "2024-06-15", None), diary(11, "2024-06-16", None)],
        )
    }

    #[test]
    fn test_diary_filter_never_returns_schedules() {
        let (schedules, diaries) = input();
        let user = ActingUser::new(ELDER, Role::Elderly);

        let records = filter_records(schedules, diaries, CategoryFilter::Diary, &user);

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| matches!(r, Record::Diary(_))));
    }

    #[test]
    fn test_schedule_filter_never_returns_diaries() {
        let (schedules, diaries) = input();
        let user = ActingUser::new(ELDER, Role::Elderly);

        let records = filter_records(schedules, diaries, CategoryFilter::Schedule, &user);

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| matches!(r, Record::Schedule(_))));
    }

    #[test]
    fn test_caregiver_gets_shared_and_caregiver_created_only() {
        let (schedules, diaries) = input();
        let user = ActingUser::new(CAREGIVER, Role::Caregiver);

        let records = filter_records(schedules, diaries, CategoryFilter::All, &user);
        let schedule_ids: Vec<_> = records
            .iter()
            .filter_map(|r| match r {
                Record::Schedule(s) => Some(s.id.as_u128()),
                Record::Diary(_) => None,
            })
            .collect();

        assert_eq!(schedule_ids, vec![1, 3]);
        assert_eq!(records.iter().filter(|r| matches!(r, Record::Diary(_))).count(), 2);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let user = ActingUser::new(ELDER, Role::Elderly);
        assert!(filter_records(vec![], vec![], CategoryFilter::All, &user).is_empty());
    }

    #[test]
    fn test_record_serializes_with_kind_tag() {
        let record = Record::Diary(diary(10, "2024-06-15", None));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["kind"], "diary");
        assert_eq!(value["record"]["date"], "2024-06-15");
    }
}
