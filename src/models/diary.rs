use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::schedule::CreatorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Excited,
    Calm,
    Sad,
    Angry,
    Tired,
}

impl Mood {
    /// Heatmap color for each mood
    pub fn color(self) -> &'static str {
        match self {
            Mood::Happy => "#FFD93D",
            Mood::Excited => "#FF8C42",
            Mood::Calm => "#6BCB77",
            Mood::Sad => "#4D96FF",
            Mood::Angry => "#FF6B6B",
            Mood::Tired => "#A78BDA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiaryStatus {
    Draft,
    Published,
}

/// A dated journal entry about one elderly user. Several entries may share a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiaryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub author_type: CreatorType,
    pub date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub content: String,
    pub status: DiaryStatus,
    #[serde(default)]
    pub is_auto_generated: bool,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    #[serde(default)]
    pub comment_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DiaryRecord {
    pub fn is_published(&self) -> bool {
        self.status == DiaryStatus::Published
    }
}
