// src/repositories/profile_repository.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::rows::{ProfileInsert, ProfilePatch, ProfileRow};
use crate::domain::{ProfileChanges, UserProfile};
use crate::error::AppResult;
use crate::integrations::supabase::{SupabaseClient, TableQuery};

const PROFILES: &str = "profiles";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Profiles for every id found; unknown ids are skipped
    async fn list_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<UserProfile>>;

    async fn insert(&self, profile: UserProfile) -> AppResult<()>;

    /// Writes the given fields and stamps `updated_at`
    async fn update(&self, id: Uuid, changes: ProfileChanges) -> AppResult<()>;
}

pub struct SupabaseProfileRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseProfileRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileRepository for SupabaseProfileRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let query = TableQuery::new(PROFILES).select("*").eq("id", id).limit(1);
        let rows: Vec<ProfileRow> = self.client.select(&query).await?;
        Ok(rows.into_iter().next().map(UserProfile::from))
    }

    async fn list_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = TableQuery::new(PROFILES).select("*").in_list("id", ids);
        let rows: Vec<ProfileRow> = self.client.select(&query).await?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }

    async fn insert(&self, profile: UserProfile) -> AppResult<()> {
        let _: Vec<ProfileRow> = self
            .client
            .insert(PROFILES, &ProfileInsert::from(&profile))
            .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, changes: ProfileChanges) -> AppResult<()> {
        let patch = ProfilePatch {
            username: changes.username.as_deref(),
            avatar_url: changes.avatar_url.as_deref(),
            updated_at: Utc::now(),
        };
        let query = TableQuery::new(PROFILES).eq("id", id);
        self.client.update(&query, &patch).await
    }
}
