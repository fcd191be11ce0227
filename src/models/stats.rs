use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::schedule::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatsPeriod {
    #[default]
    Month,
    LastMonth,
}

impl StatsPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            StatsPeriod::Month => "month",
            StatsPeriod::LastMonth => "last_month",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub category: Category,
    pub total: u32,
    pub completed: u32,
    #[serde(default)]
    pub pending: u32,
    #[serde(default)]
    pub cancelled: u32,
}

/// Period summary computed by the care API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct DetailedStats {
    pub total: u32,
    pub completed: u32,
    #[serde(default)]
    pub pending: u32,
    #[serde(default)]
    pub cancelled: u32,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub by_category: Vec<CategorySummary>,
}

impl DetailedStats {
    pub fn category(&self, category: Category) -> Option<&CategorySummary> {
        self.by_category.iter().find(|c| c.category == category)
    }
}
