// src/application/state.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::events::EventBus;
use crate::infrastructure::SessionStorage;
use crate::integrations::{AuthBackend, GoTrueAuth, SupabaseClient};
use crate::repositories::{
    CommentRepository, ProfileRepository, SupabaseCommentRepository, SupabaseProfileRepository,
    SupabaseVideoRepository, VideoRepository,
};
use crate::services::{CommentService, PlayerConfig, SessionStore, VideoService};

/// Shared application state handed to every command.
/// All fields are Arc-wrapped for sharing across tasks.
pub struct AppState {
    pub config: AppConfig,
    pub player_config: PlayerConfig,
    pub event_bus: Arc<EventBus>,
    pub client: Arc<SupabaseClient>,
    pub session_store: Arc<SessionStore>,
    pub video_service: Arc<VideoService>,
    pub comment_service: Arc<CommentService>,
}

impl AppState {
    /// Wires the hosted backend into repositories and services
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let client = Arc::new(SupabaseClient::from_config(&config)?);
        let storage = SessionStorage::default_location()?;
        let auth: Arc<dyn AuthBackend> = Arc::new(GoTrueAuth::new(Arc::clone(&client), storage));

        let video_repo: Arc<dyn VideoRepository> =
            Arc::new(SupabaseVideoRepository::new(Arc::clone(&client)));
        let comment_repo: Arc<dyn CommentRepository> =
            Arc::new(SupabaseCommentRepository::new(Arc::clone(&client)));
        let profile_repo: Arc<dyn ProfileRepository> =
            Arc::new(SupabaseProfileRepository::new(Arc::clone(&client)));

        Ok(Self::from_parts(
            config,
            client,
            auth,
            video_repo,
            comment_repo,
            profile_repo,
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        client: Arc<SupabaseClient>,
        auth: Arc<dyn AuthBackend>,
        video_repo: Arc<dyn VideoRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new());

        let session_store = Arc::new(SessionStore::new(
            auth,
            Arc::clone(&profile_repo),
            Arc::clone(&event_bus),
        ));
        let video_service = Arc::new(VideoService::new(
            video_repo,
            Arc::clone(&event_bus),
            config.page_size,
        ));
        let comment_service = Arc::new(CommentService::new(
            comment_repo,
            profile_repo,
            Arc::clone(&event_bus),
        ));

        Self {
            config,
            player_config: PlayerConfig::default(),
            event_bus,
            client,
            session_store,
            video_service,
            comment_service,
        }
    }
}
