// src/services/media_element.rs
//
// Seams between the playback controller and whatever actually plays media.
//
// CRITICAL RULES:
// - Notifications are delivered in emission order
// - `play` may be refused; the caller decides how to recover
// - Elements never hold controller state

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::AppResult;

/// Notifications raised by a playing element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Duration became known
    LoadedMetadata { duration: f64 },
    TimeUpdate { current_time: f64 },
    /// Playback stalled waiting for data
    Waiting,
    /// Playback resumed after a stall or start
    Playing,
}

#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Err means the platform refused to start playback
    async fn play(&self) -> AppResult<()>;

    async fn pause(&self) -> AppResult<()>;

    async fn current_time(&self) -> AppResult<f64>;

    /// The element clamps to its own bounds
    async fn set_current_time(&self, seconds: f64) -> AppResult<()>;

    async fn set_volume(&self, volume: f64) -> AppResult<()>;

    async fn set_muted(&self, muted: bool) -> AppResult<()>;

    async fn set_playback_rate(&self, rate: f64) -> AppResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent>;
}

/// Presentation surface that can go fullscreen
#[async_trait]
pub trait FullscreenHost: Send + Sync {
    async fn is_fullscreen(&self) -> AppResult<bool>;

    async fn request_fullscreen(&self) -> AppResult<()>;

    async fn exit_fullscreen(&self) -> AppResult<()>;
}
