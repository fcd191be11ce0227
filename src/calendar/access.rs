//! Role and ownership rules for schedules and diaries.
//!
//! Every predicate is total over `Role`; an `Unrecognized` role is denied everything.

use crate::models::{ActingUser, CreatorType, DiaryRecord, Role, ScheduleRecord};

/// Full edit rights on a schedule (title, time, recurrence, sharing, delete).
/// An elder only ever edits schedules they own.
pub fn can_modify(record: &ScheduleRecord, user: &ActingUser) -> bool {
    match user.role {
        Role::Elderly if record.elderly_id != user.id => false,
        Role::Elderly => match record.creator_type {
            CreatorType::Elderly => record.creator_id == user.id,
            CreatorType::Ai => true,
            CreatorType::Caregiver => false,
        },
        Role::Caregiver => match record.creator_type {
            CreatorType::Caregiver => record.creator_id == user.id,
            CreatorType::Elderly | CreatorType::Ai => false,
        },
        Role::Unrecognized => false,
    }
}

pub fn can_delete(record: &ScheduleRecord, user: &ActingUser) -> bool {
    can_modify(record, user)
}

/// Mark a schedule completed or cancelled. The elder may do this for caregiver-created
/// schedules they cannot otherwise edit.
pub fn can_complete(record: &ScheduleRecord, user: &ActingUser) -> bool {
    match user.role {
        Role::Elderly => {
            can_modify(record, user)
                || (record.creator_type == CreatorType::Caregiver && record.elderly_id == user.id)
        }
        Role::Caregiver => can_modify(record, user),
        Role::Unrecognized => false,
    }
}

/// Caregivers see every caregiver-created schedule plus whatever the elder shared.
pub fn is_visible(record: &ScheduleRecord, user: &ActingUser) -> bool {
    match user.role {
        Role::Elderly => record.elderly_id == user.id,
        Role::Caregiver => {
            record.creator_type == CreatorType::Caregiver || record.is_shared_with_caregiver
        }
        Role::Unrecognized => false,
    }
}

/// Drafts stay private to their author.
pub fn diary_visible(diary: &DiaryRecord, user: &ActingUser) -> bool {
    match user.role {
        Role::Elderly => diary.user_id == user.id || diary.author_id == user.id,
        Role::Caregiver => diary.is_published() || diary.author_id == user.id,
        Role::Unrecognized => false,
    }
}
