// src/test_support.rs
//
// Hand-written fakes shared by unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::Video;
use crate::error::{AppError, AppResult};
use crate::repositories::VideoRepository;
use crate::services::media_element::{FullscreenHost, MediaElement, MediaEvent};

// ============================================================================
// Media element
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Play,
    Pause,
    SetCurrentTime(f64),
    SetVolume(f64),
    SetMuted(bool),
    SetPlaybackRate(f64),
}

/// Records every command; `play` can be told to refuse
pub struct FakeMediaElement {
    commands: Mutex<Vec<MediaCommand>>,
    refusal: Mutex<Option<String>>,
    position: Mutex<f64>,
    events: broadcast::Sender<MediaEvent>,
}

impl FakeMediaElement {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(32);
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            refusal: Mutex::new(None),
            position: Mutex::new(0.0),
            events,
        })
    }

    pub fn commands(&self) -> Vec<MediaCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.lock().unwrap().clear();
    }

    /// Every following `play` fails with `reason`
    pub fn refuse_play(&self, reason: &str) {
        *self.refusal.lock().unwrap() = Some(reason.to_string());
    }

    pub fn allow_play(&self) {
        *self.refusal.lock().unwrap() = None;
    }

    pub fn set_position(&self, seconds: f64) {
        *self.position.lock().unwrap() = seconds;
    }

    /// Delivers a notification to subscribers
    pub fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }

    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn record(&self, command: MediaCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

#[async_trait]
impl MediaElement for FakeMediaElement {
    async fn play(&self) -> AppResult<()> {
        self.record(MediaCommand::Play);
        match self.refusal.lock().unwrap().clone() {
            Some(reason) => Err(AppError::Player(reason)),
            None => Ok(()),
        }
    }

    async fn pause(&self) -> AppResult<()> {
        self.record(MediaCommand::Pause);
        Ok(())
    }

    async fn current_time(&self) -> AppResult<f64> {
        Ok(*self.position.lock().unwrap())
    }

    async fn set_current_time(&self, seconds: f64) -> AppResult<()> {
        self.record(MediaCommand::SetCurrentTime(seconds));
        Ok(())
    }

    async fn set_volume(&self, volume: f64) -> AppResult<()> {
        self.record(MediaCommand::SetVolume(volume));
        Ok(())
    }

    async fn set_muted(&self, muted: bool) -> AppResult<()> {
        self.record(MediaCommand::SetMuted(muted));
        Ok(())
    }

    async fn set_playback_rate(&self, rate: f64) -> AppResult<()> {
        self.record(MediaCommand::SetPlaybackRate(rate));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}

#[derive(Default)]
pub struct FakeFullscreenHost {
    fullscreen: AtomicBool,
    failing: AtomicBool,
}

impl FakeFullscreenHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_requests(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn is_on(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FullscreenHost for FakeFullscreenHost {
    async fn is_fullscreen(&self) -> AppResult<bool> {
        Ok(self.is_on())
    }

    async fn request_fullscreen(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Player("fullscreen denied".to_string()));
        }
        self.fullscreen.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn exit_fullscreen(&self) -> AppResult<()> {
        self.fullscreen.store(false, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Video created `minutes_ago` minutes before a fixed instant
pub fn sample_video(title: &str, minutes_ago: i64) -> Video {
    let base = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
    Video {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        duration: 90.0,
        thumbnail_url: None,
        video_url: format!("https://stream.mux.com/{}", title.replace(' ', "-")),
        user_id: None,
        created_at: base - Duration::minutes(minutes_ago),
    }
}

/// Behaves like the hosted `videos` table for reads
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<Vec<Video>>,
    viewed: Mutex<Vec<Uuid>>,
    failing: AtomicBool,
}

impl InMemoryVideoRepository {
    pub fn with_videos(videos: Vec<Video>) -> Arc<Self> {
        Arc::new(Self {
            videos: Mutex::new(videos),
            ..Default::default()
        })
    }

    /// `count` videos titled "Video 0".."Video n", newest first
    pub fn with_count(count: usize) -> Arc<Self> {
        Self::with_videos(
            (0..count)
                .map(|i| sample_video(&format!("Video {}", i), i as i64))
                .collect(),
        )
    }

    pub fn fail_requests(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn viewed(&self) -> Vec<Uuid> {
        self.viewed.lock().unwrap().clone()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Backend {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn list(
        &self,
        page: usize,
        page_size: usize,
        search: Option<String>,
    ) -> AppResult<Vec<Video>> {
        self.check()?;
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|video| match search.as_deref().map(str::trim) {
                Some(term) if !term.is_empty() => video.title_contains(term),
                _ => true,
            })
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Video>> {
        self.check()?;
        Ok(self
            .videos
            .lock()
            .unwrap()
            .iter()
            .find(|video| video.id == id)
            .cloned())
    }

    async fn list_related(&self, id: Uuid, limit: usize) -> AppResult<Vec<Video>> {
        self.check()?;
        Ok(self
            .videos
            .lock()
            .unwrap()
            .iter()
            .filter(|video| video.id != id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn increment_views(&self, id: Uuid) -> AppResult<()> {
        self.check()?;
        self.viewed.lock().unwrap().push(id);
        Ok(())
    }
}
