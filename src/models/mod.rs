pub mod diary;
pub mod schedule;
pub mod schedule_input;
pub mod stats;
pub mod user;

pub use diary::{DiaryRecord, DiaryStatus, Mood};
pub use schedule::{Category, CreatorType, Recurrence, RecurrenceError, RecurringType, ScheduleRecord, ScheduleStatus};
pub use schedule_input::{CreateScheduleInput, ScheduleMutationResponse, UpdateScheduleInput};
pub use stats::{CategorySummary, DetailedStats, StatsPeriod};
pub use user::{ActingUser, ConnectedElderly, Connection, Role};
