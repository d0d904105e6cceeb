// src/application/views/video_page.rs
//
// Video Page - one video, its player, related videos and comments
//
// CRITICAL RULES:
// - The page owns its player; leaving the page drops it
// - View counting runs in the background
// - Related-video failures are logged, never shown

use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::views::CommentThread;
use crate::domain::Video;
use crate::error::AppError;
use crate::events::EventBus;
use crate::services::{
    CommentService, PlaybackController, PlayerConfig, SessionStore, VideoService,
};

pub const LOAD_FAILED_MESSAGE: &str = "The requested video could not be loaded.";

pub struct VideoPageView {
    video_service: Arc<VideoService>,
    comment_service: Arc<CommentService>,
    session_store: Arc<SessionStore>,
    event_bus: Arc<EventBus>,
    player_config: PlayerConfig,
    video: Option<Video>,
    related: Vec<Video>,
    error: Option<String>,
    player: Option<Arc<PlaybackController>>,
    comments: Option<CommentThread>,
    view_count: Option<JoinHandle<()>>,
}

impl VideoPageView {
    pub fn new(
        video_service: Arc<VideoService>,
        comment_service: Arc<CommentService>,
        session_store: Arc<SessionStore>,
        event_bus: Arc<EventBus>,
        player_config: PlayerConfig,
    ) -> Self {
        Self {
            video_service,
            comment_service,
            session_store,
            event_bus,
            player_config,
            video: None,
            related: Vec::new(),
            error: None,
            player: None,
            comments: None,
            view_count: None,
        }
    }

    pub fn video(&self) -> Option<&Video> {
        self.video.as_ref()
    }

    pub fn related(&self) -> &[Video] {
        &self.related
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn player(&self) -> Option<Arc<PlaybackController>> {
        self.player.clone()
    }

    pub fn comments(&self) -> Option<&CommentThread> {
        self.comments.as_ref()
    }

    pub fn comments_mut(&mut self) -> Option<&mut CommentThread> {
        self.comments.as_mut()
    }

    /// Loads everything for `id`, replacing the previous video and player
    pub async fn load(&mut self, id: Uuid) {
        self.unload();

        let video = match self.video_service.get_video(id).await {
            Ok(video) => video,
            Err(AppError::NotFound) => {
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
                return;
            }
            Err(e) => {
                log::warn!("video {} failed to load: {}", id, e);
                self.error = Some(e.to_string());
                return;
            }
        };

        self.player = Some(Arc::new(PlaybackController::new(
            video.video_url.clone(),
            video.title.clone(),
            true,
            Arc::clone(&self.event_bus),
            self.player_config.clone(),
        )));
        self.view_count = Some(self.video_service.record_view(id));
        self.video = Some(video);

        self.related = match self.video_service.related_videos(id).await {
            Ok(related) => related,
            Err(e) => {
                log::error!("related videos for {} failed: {}", id, e);
                Vec::new()
            }
        };

        let mut comments = CommentThread::new(
            Arc::clone(&self.comment_service),
            Arc::clone(&self.session_store),
            id,
        );
        comments.load().await;
        self.comments = Some(comments);
    }

    /// Drops the player and everything loaded for the current video
    pub fn unload(&mut self) {
        if let Some(player) = self.player.take() {
            player.detach();
        }
        self.video = None;
        self.related.clear();
        self.error = None;
        self.comments = None;
        self.view_count = None;
    }

    /// Background view-count task of the current video
    pub fn take_view_count_task(&mut self) -> Option<JoinHandle<()>> {
        self.view_count.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::auth::MockAuthBackend;
    use crate::repositories::{MockCommentRepository, MockProfileRepository, VideoRepository};
    use crate::test_support::InMemoryVideoRepository;

    fn page(repo: Arc<InMemoryVideoRepository>) -> VideoPageView {
        let bus = Arc::new(EventBus::new());
        let mut comments = MockCommentRepository::new();
        comments.expect_list_by_video().returning(|_| Ok(Vec::new()));

        VideoPageView::new(
            Arc::new(VideoService::new(repo, Arc::clone(&bus), 12)),
            Arc::new(CommentService::new(
                Arc::new(comments),
                Arc::new(MockProfileRepository::new()),
                Arc::clone(&bus),
            )),
            Arc::new(SessionStore::new(
                Arc::new(MockAuthBackend::new()),
                Arc::new(MockProfileRepository::new()),
                Arc::clone(&bus),
            )),
            bus,
            PlayerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_load_builds_player_and_counts_view() {
        let repo = InMemoryVideoRepository::with_count(8);
        let target = repo.list(0, 1, None).await.unwrap().remove(0);
        let mut view = page(repo.clone());

        view.load(target.id).await;

        assert_eq!(view.video().map(|v| v.id), Some(target.id));
        assert_eq!(view.related().len(), 5);
        assert!(view.comments().unwrap().comments().is_empty());

        let player = view.player().unwrap();
        let session = player.snapshot();
        assert!(session.is_playing());
        assert_eq!(session.title(), target.title);

        view.take_view_count_task().unwrap().await.unwrap();
        assert_eq!(repo.viewed(), vec![target.id]);
    }

    #[tokio::test]
    async fn test_missing_video_message() {
        let mut view = page(InMemoryVideoRepository::with_count(2));
        view.load(Uuid::new_v4()).await;

        assert!(view.video().is_none());
        assert!(view.player().is_none());
        assert_eq!(view.error(), Some(LOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_unload_releases_player() {
        let repo = InMemoryVideoRepository::with_count(3);
        let target = repo.list(0, 1, None).await.unwrap().remove(0);
        let mut view = page(repo);

        view.load(target.id).await;
        let player = view.player().unwrap();
        assert_eq!(Arc::strong_count(&player), 2);

        view.unload();
        assert!(view.video().is_none());
        assert_eq!(Arc::strong_count(&player), 1);
    }
}
