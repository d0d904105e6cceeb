// src/repositories/video_repository.rs
//
// Catalog reads and the view counter

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use super::rows::VideoRow;
use crate::domain::Video;
use crate::error::AppResult;
use crate::integrations::supabase::{SupabaseClient, TableQuery};

const VIDEOS: &str = "videos";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Newest first, `page_size` rows starting at `page * page_size`,
    /// optionally limited to titles containing `search` (any case)
    async fn list(&self, page: usize, page_size: usize, search: Option<String>)
        -> AppResult<Vec<Video>>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Video>>;

    /// Any videos other than `id`, no particular order
    async fn list_related(&self, id: Uuid, limit: usize) -> AppResult<Vec<Video>>;

    async fn increment_views(&self, id: Uuid) -> AppResult<()>;
}

pub struct SupabaseVideoRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseVideoRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn fetch(&self, query: TableQuery) -> AppResult<Vec<Video>> {
        let rows: Vec<VideoRow> = self.client.select(&query).await?;
        Ok(rows.into_iter().map(Video::from).collect())
    }
}

/// Query for one catalog page
pub(crate) fn catalog_query(page: usize, page_size: usize, search: Option<&str>) -> TableQuery {
    let query = TableQuery::new(VIDEOS)
        .select("*")
        .order_desc("created_at")
        .range(page * page_size, page_size);

    match search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => query.ilike_contains("title", term),
        None => query,
    }
}

#[async_trait]
impl VideoRepository for SupabaseVideoRepository {
    async fn list(
        &self,
        page: usize,
        page_size: usize,
        search: Option<String>,
    ) -> AppResult<Vec<Video>> {
        log::debug!(
            "listing videos page={} size={} search={:?}",
            page,
            page_size,
            search
        );
        self.fetch(catalog_query(page, page_size, search.as_deref()))
            .await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Video>> {
        let query = TableQuery::new(VIDEOS).select("*").eq("id", id).limit(1);
        Ok(self.fetch(query).await?.into_iter().next())
    }

    async fn list_related(&self, id: Uuid, limit: usize) -> AppResult<Vec<Video>> {
        let query = TableQuery::new(VIDEOS)
            .select("*")
            .neq("id", id)
            .limit(limit);
        self.fetch(query).await
    }

    async fn increment_views(&self, id: Uuid) -> AppResult<()> {
        self.client
            .rpc("increment_video_views", &json!({ "video_id": id }))
            .await?;
        Ok(())
    }
}
