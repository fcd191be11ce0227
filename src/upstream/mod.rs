//! Client side of the care REST API. Schedules, diaries, statistics and rosters all
//! live there; this service only reads them and forwards mutations.

pub mod client;
pub mod roster;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{
        ActingUser, ConnectedElderly, Connection, CreateScheduleInput, DetailedStats, DiaryRecord,
        ScheduleRecord, StatsPeriod, UpdateScheduleInput,
    },
    AppResult,
};

pub use client::HttpCareApi;
pub use roster::RosterCache;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elderly_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiaryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elderly_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub limit: u32,
    pub skip: u32,
}

#[async_trait]
pub trait CareDataSource: Send + Sync {
    async fn list_schedules(&self, user: &ActingUser, query: &ScheduleQuery) -> AppResult<Vec<ScheduleRecord>>;

    /// One page of diaries
    async fn list_diaries(&self, user: &ActingUser, query: &DiaryQuery) -> AppResult<Vec<DiaryRecord>>;

    async fn get_schedule(&self, user: &ActingUser, id: Uuid) -> AppResult<ScheduleRecord>;

    async fn create_schedule(&self, user: &ActingUser, input: &CreateScheduleInput) -> AppResult<ScheduleRecord>;

    async fn update_schedule(
        &self,
        user: &ActingUser,
        id: Uuid,
        input: &UpdateScheduleInput,
    ) -> AppResult<ScheduleRecord>;

    async fn delete_schedule(&self, user: &ActingUser, id: Uuid, delete_all_recurring: bool) -> AppResult<()>;

    async fn complete_schedule(&self, user: &ActingUser, id: Uuid) -> AppResult<ScheduleRecord>;

    async fn cancel_schedule(&self, user: &ActingUser, id: Uuid) -> AppResult<ScheduleRecord>;

    async fn get_detailed_stats(
        &self,
        user: &ActingUser,
        period: StatsPeriod,
        elderly_id: Option<Uuid>,
    ) -> AppResult<DetailedStats>;

    async fn get_connected_elderly(&self, user: &ActingUser) -> AppResult<Vec<ConnectedElderly>>;

    async fn get_connections(&self, user: &ActingUser) -> AppResult<Vec<Connection>>;
}

/// Upper bound on diary pages per listing
pub const MAX_DIARY_PAGES: u32 = 200;

/// Every diary matching `query`, fetched page by page until an empty page comes back.
/// The upstream may cap `limit` below `page_size`, so `skip` advances by what was
/// actually returned.
pub async fn list_all_diaries(
    source: &dyn CareDataSource,
    user: &ActingUser,
    mut query: DiaryQuery,
    page_size: u32,
) -> AppResult<Vec<DiaryRecord>> {
    query.limit = page_size.max(1);
    query.skip = 0;

    let mut diaries = Vec::new();
    let mut pages = 0;
    loop {
        if pages == MAX_DIARY_PAGES {
            tracing::warn!(
                pages, count = diaries.len(), elderly_id = ?query.elderly_id,
                "Diary listing hit the page limit, history may be incomplete"
            );
            break;
        }

        let page = source.list_diaries(user, &query).await?;
        pages += 1;
        if page.is_empty() {
            break;
        }

        query.skip += page.len() as u32;
        diaries.extend(page);
    }

    tracing::debug!(count = diaries.len(), pages, "Fetched diaries");
    Ok(diaries)
}
