// src/services/video_service.rs
//
// Video Service - catalog reads and view counting
//
// CRITICAL RULES:
// - Pages are fixed-size; a short page means the catalog is exhausted
// - View counting never blocks the caller and never surfaces errors

use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::Video;
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, VideoViewed};
use crate::repositories::VideoRepository;

pub const RELATED_LIMIT: usize = 5;

/// One fetched catalog page
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub page: usize,
    pub videos: Vec<Video>,
    pub has_more: bool,
}

pub struct VideoService {
    video_repo: Arc<dyn VideoRepository>,
    event_bus: Arc<EventBus>,
    page_size: usize,
}

impl VideoService {
    pub fn new(video_repo: Arc<dyn VideoRepository>, event_bus: Arc<EventBus>, page_size: usize) -> Self {
        Self {
            video_repo,
            event_bus,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Blank search terms are treated as no search
    pub async fn list_page(&self, page: usize, search: Option<&str>) -> AppResult<CatalogPage> {
        let search = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string);

        let videos = self.video_repo.list(page, self.page_size, search).await?;
        let has_more = videos.len() == self.page_size;

        Ok(CatalogPage {
            page,
            videos,
            has_more,
        })
    }

    pub async fn get_video(&self, id: Uuid) -> AppResult<Video> {
        self.video_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn related_videos(&self, id: Uuid) -> AppResult<Vec<Video>> {
        self.video_repo.list_related(id, RELATED_LIMIT).await
    }

    /// Bumps the view counter in the background
    pub fn record_view(&self, id: Uuid) -> JoinHandle<()> {
        self.event_bus.emit(VideoViewed::new(id));

        let video_repo = Arc::clone(&self.video_repo);
        tokio::spawn(async move {
            if let Err(e) = video_repo.increment_views(id).await {
                log::warn!("could not count view for {}: {}", id, e);
            }
        })
    }
}
