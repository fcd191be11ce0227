//! Calendar and diary aggregation: fetch windows, visibility, grouping and the derived
//! streak, heatmap and completion analytics. Everything here is synchronous and pure;
//! callers pass `today` and the acting user explicitly.

pub mod access;
pub mod completion;
pub mod filter;
pub mod grouping;
pub mod heatmap;
pub mod streak;
pub mod window;

pub use completion::{category_ratios, health_report, today_status, CategoryRatio, HealthReport, TodayStatus};
pub use filter::{filter_records, CategoryFilter};
pub use grouping::{group_records, GroupBy, GroupedRecords};
pub use heatmap::{build_heatmap, Heatmap};
pub use streak::{writing_streak, StreakSummary};
pub use window::{resolve_window, DateWindow, MonthKey, RecordKind, ViewMode};
