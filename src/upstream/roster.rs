use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::CareDataSource;
use crate::{
    models::{ActingUser, ConnectedElderly, Role},
    AppError, AppResult,
};

/// Connected-elderly lists per caregiver, refreshed after the TTL
pub struct RosterCache {
    cache: Cache<Uuid, Arc<Vec<ConnectedElderly>>>,
}

impl RosterCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(10_000)
            .build();

        Self { cache }
    }

    pub async fn connected_elderly(
        &self,
        source: &dyn CareDataSource,
        user: &ActingUser,
    ) -> AppResult<Arc<Vec<ConnectedElderly>>> {
        if let Some(cached) = self.cache.get(&user.id).await {
            tracing::debug!(user_id = %user.id, "Roster resolved from cache");
            return Ok(cached);
        }

        let roster = Arc::new(source.get_connected_elderly(user).await?);
        self.cache.insert(user.id, roster.clone()).await;
        tracing::debug!(user_id = %user.id, count = roster.len(), "Roster cached");

        Ok(roster)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// The elderly user a request is about. Elders always act on themselves; caregivers
    /// name someone on their roster or fall back to the first connection.
    pub async fn resolve_subject(
        &self,
        source: &dyn CareDataSource,
        user: &ActingUser,
        requested: Option<Uuid>,
    ) -> AppResult<Uuid> {
        match user.role {
            Role::Elderly => match requested {
                Some(id) if id != user.id => Err(AppError::Forbidden(
                    "Elderly users can only view their own calendar".to_string(),
                )),
                _ => Ok(user.id),
            },
            Role::Caregiver => {
                let roster = self.connected_elderly(source, user).await?;
                match requested {
                    Some(id) if roster.iter().any(|e| e.id == id) => Ok(id),
                    Some(id) => {
                        tracing::warn!(caregiver_id = %user.id, elderly_id = %id, "Elderly not on caregiver roster");
                        Err(AppError::Forbidden(format!("Elderly {} is not connected to you", id)))
                    }
                    None => roster.first().map(|e| e.id).ok_or_else(|| {
                        AppError::NotFound("No connected elderly for this caregiver".to_string())
                    }),
                }
            }
            Role::Unrecognized => Err(AppError::Forbidden("Unrecognized role".to_string())),
        }
    }
}
