// src/services/playback_controller.rs
//
// Playback Controller - one per mounted player
//
// CRITICAL RULES:
// - Owns the PlaybackSession exclusively
// - Duration, current time and buffering are written ONLY by element notifications
// - A refused play() falls back to paused, silently
// - Exactly one auto-hide countdown is alive at a time
// - Detach/Drop releases the listener task and the countdown
// - Operations without an attached element update state and skip the element

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{validate_playback_session, PlaybackRate, PlaybackSession};
use crate::error::AppResult;
use crate::events::{
    ControlsHidden, ControlsShown, EventBus, FullscreenToggled, PlaybackRejected,
    PlaybackToggled,
};
use crate::services::media_element::{FullscreenHost, MediaElement, MediaEvent};

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Inactivity before controls hide during playback
    pub auto_hide_delay: Duration,
    /// Step used by skip forward / skip back
    pub skip_seconds: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_hide_delay: Duration::from_secs(3),
            skip_seconds: 30.0,
        }
    }
}

fn lock(session: &Mutex<PlaybackSession>) -> MutexGuard<'_, PlaybackSession> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}

/// Applies one element notification to the session
fn apply_media_event(session: &Mutex<PlaybackSession>, event: MediaEvent) {
    let mut session = lock(session);
    match event {
        MediaEvent::LoadedMetadata { duration } => session.record_metadata(duration),
        MediaEvent::TimeUpdate { current_time } => session.record_time(current_time),
        MediaEvent::Waiting => session.record_waiting(),
        MediaEvent::Playing => session.record_playing(),
    }
    if let Err(e) = validate_playback_session(&session) {
        log::warn!("player state out of range after notification: {}", e);
    }
}

pub struct PlaybackController {
    player_id: Uuid,
    session: Arc<Mutex<PlaybackSession>>,
    element: Mutex<Option<Arc<dyn MediaElement>>>,
    fullscreen: Mutex<Option<Arc<dyn FullscreenHost>>>,
    event_bus: Arc<EventBus>,
    config: PlayerConfig,
    hide_timer: Mutex<Option<JoinHandle<()>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackController {
    pub fn new(
        video_url: impl Into<String>,
        title: impl Into<String>,
        auto_play: bool,
        event_bus: Arc<EventBus>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            player_id: Uuid::new_v4(),
            session: Arc::new(Mutex::new(PlaybackSession::new(video_url, title, auto_play))),
            element: Mutex::new(None),
            fullscreen: Mutex::new(None),
            event_bus,
            config,
            hide_timer: Mutex::new(None),
            listener: Mutex::new(None),
        }
    }

    pub fn player_id(&self) -> Uuid {
        self.player_id
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> PlaybackSession {
        lock(&self.session).clone()
    }

    pub fn progress_fraction(&self) -> f64 {
        lock(&self.session).progress_fraction()
    }

    pub fn is_attached(&self) -> bool {
        self.element().is_some()
    }

    fn element(&self) -> Option<Arc<dyn MediaElement>> {
        self.element
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn fullscreen_host(&self) -> Option<Arc<dyn FullscreenHost>> {
        self.fullscreen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Binds a media element: registers the notification listener, pushes
    /// the current settings to it and starts playback when auto-playing.
    pub async fn attach(
        &self,
        element: Arc<dyn MediaElement>,
        fullscreen: Option<Arc<dyn FullscreenHost>>,
    ) {
        self.detach();

        let receiver = element.subscribe();
        let listener = self.spawn_listener(receiver);
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener);
        *self.element.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&element));
        *self.fullscreen.lock().unwrap_or_else(|e| e.into_inner()) = fullscreen;

        let (volume, muted, rate, playing) = {
            let session = lock(&self.session);
            (
                session.volume(),
                session.is_muted(),
                session.playback_rate(),
                session.is_playing(),
            )
        };

        if let Err(e) = element.set_volume(volume).await {
            log::warn!("player {}: could not apply volume: {}", self.player_id, e);
        }
        if let Err(e) = element.set_muted(muted).await {
            log::warn!("player {}: could not apply mute: {}", self.player_id, e);
        }
        if let Err(e) = element.set_playback_rate(rate.as_f64()).await {
            log::warn!("player {}: could not apply rate: {}", self.player_id, e);
        }

        log::debug!("player {} attached", self.player_id);

        if playing {
            self.arm_hide_timer();
            self.start_element(&element).await;
        }
    }

    /// Releases the element, its listener and the auto-hide countdown
    pub fn detach(&self) {
        if let Some(listener) = self
            .listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            listener.abort();
        }
        self.cancel_hide_timer();
        let had_element = self
            .element
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some();
        *self.fullscreen.lock().unwrap_or_else(|e| e.into_inner()) = None;

        if had_element {
            log::debug!("player {} detached", self.player_id);
        }
    }

    fn spawn_listener(&self, mut receiver: broadcast::Receiver<MediaEvent>) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let player_id = self.player_id;

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => apply_media_event(&session, event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("player {} missed {} notifications", player_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    // ------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------

    /// Flips play/pause and commands the element. Returns the resulting
    /// playing state, which is false again if the element refused to play.
    pub async fn toggle_play(&self) -> bool {
        let playing = lock(&self.session).toggle_playing();
        self.event_bus
            .emit(PlaybackToggled::new(self.player_id, playing));

        if lock(&self.session).controls_visible() {
            self.arm_hide_timer();
        }

        if let Some(element) = self.element() {
            if playing {
                self.start_element(&element).await;
            } else if let Err(e) = element.pause().await {
                log::warn!("player {}: pause failed: {}", self.player_id, e);
            }
        }

        lock(&self.session).is_playing()
    }

    async fn start_element(&self, element: &Arc<dyn MediaElement>) {
        if let Err(e) = element.play().await {
            log::warn!("player {}: play refused: {}", self.player_id, e);
            lock(&self.session).reject_play();
            self.event_bus
                .emit(PlaybackRejected::new(self.player_id, e.to_string()));
        }
    }

    /// Returns the new muted flag. Volume is untouched.
    pub async fn toggle_mute(&self) -> bool {
        let muted = lock(&self.session).toggle_mute();
        if let Some(element) = self.element() {
            if let Err(e) = element.set_muted(muted).await {
                log::warn!("player {}: mute failed: {}", self.player_id, e);
            }
        }
        muted
    }

    /// Volume in [0, 1]; out-of-range values are clamped, NaN is rejected
    pub async fn set_volume(&self, volume: f64) -> AppResult<()> {
        let (volume, muted) = {
            let mut session = lock(&self.session);
            session.set_volume(volume)?;
            (session.volume(), session.is_muted())
        };

        if let Some(element) = self.element() {
            if let Err(e) = element.set_volume(volume).await {
                log::warn!("player {}: volume failed: {}", self.player_id, e);
            }
            if let Err(e) = element.set_muted(muted).await {
                log::warn!("player {}: mute failed: {}", self.player_id, e);
            }
        }
        Ok(())
    }

    /// Seeks to `fraction` of the duration. No-op while the duration is
    /// unknown or no element is attached. Returns the requested position.
    pub async fn seek_to(&self, fraction: f64) -> Option<f64> {
        let target = lock(&self.session).seek_target(fraction)?;
        let element = self.element()?;

        match element.set_current_time(target).await {
            Ok(()) => Some(target),
            Err(e) => {
                log::warn!("player {}: seek failed: {}", self.player_id, e);
                None
            }
        }
    }

    /// Moves by `delta_seconds` from the element's position; the element clamps
    pub async fn seek_relative(&self, delta_seconds: f64) -> Option<f64> {
        if !delta_seconds.is_finite() {
            return None;
        }
        let element = self.element()?;

        let from = match element.current_time().await {
            Ok(time) => time,
            Err(_) => self.snapshot().current_time(),
        };
        let target = from + delta_seconds;

        match element.set_current_time(target).await {
            Ok(()) => Some(target),
            Err(e) => {
                log::warn!("player {}: seek failed: {}", self.player_id, e);
                None
            }
        }
    }

    pub async fn skip_forward(&self) -> Option<f64> {
        self.seek_relative(self.config.skip_seconds).await
    }

    pub async fn skip_back(&self) -> Option<f64> {
        self.seek_relative(-self.config.skip_seconds).await
    }

    pub async fn set_playback_rate(&self, rate: PlaybackRate) {
        lock(&self.session).set_playback_rate(rate);
        if let Some(element) = self.element() {
            if let Err(e) = element.set_playback_rate(rate.as_f64()).await {
                log::warn!("player {}: rate change failed: {}", self.player_id, e);
            }
        }
    }

    /// Enters fullscreen, or leaves it when already fullscreen.
    /// Returns the new state, `None` when there is no host or it failed.
    pub async fn toggle_fullscreen(&self) -> Option<bool> {
        let host = self.fullscreen_host()?;

        let result = match host.is_fullscreen().await {
            Ok(true) => host.exit_fullscreen().await.map(|_| false),
            Ok(false) => host.request_fullscreen().await.map(|_| true),
            Err(e) => Err(e),
        };

        match result {
            Ok(fullscreen) => {
                self.event_bus
                    .emit(FullscreenToggled::new(self.player_id, fullscreen));
                Some(fullscreen)
            }
            Err(e) => {
                log::warn!("player {}: fullscreen toggle failed: {}", self.player_id, e);
                None
            }
        }
    }

    /// Pointer moved over the player: show controls and restart the countdown
    pub fn pointer_moved(&self) {
        let was_hidden = lock(&self.session).show_controls();
        if was_hidden {
            self.event_bus.emit(ControlsShown::new(self.player_id));
        }
        self.arm_hide_timer();
    }

    /// Pointer left the player: hide immediately while playing
    pub fn pointer_left(&self) {
        let hidden = lock(&self.session).hide_controls_if_playing();
        if hidden {
            self.cancel_hide_timer();
            self.event_bus.emit(ControlsHidden::new(self.player_id));
        }
    }

    // ------------------------------------------------------------------
    // Element notifications
    // ------------------------------------------------------------------

    pub fn handle_media_event(&self, event: MediaEvent) {
        apply_media_event(&self.session, event);
    }

    pub fn on_loaded_metadata(&self, duration: f64) {
        self.handle_media_event(MediaEvent::LoadedMetadata { duration });
    }

    pub fn on_time_update(&self, current_time: f64) {
        self.handle_media_event(MediaEvent::TimeUpdate { current_time });
    }

    pub fn on_waiting(&self) {
        self.handle_media_event(MediaEvent::Waiting);
    }

    pub fn on_playing(&self) {
        self.handle_media_event(MediaEvent::Playing);
    }

    // ------------------------------------------------------------------
    // Auto-hide countdown
    // ------------------------------------------------------------------

    /// Replaces any running countdown with a fresh one
    fn arm_hide_timer(&self) {
        let session = Arc::clone(&self.session);
        let event_bus = Arc::clone(&self.event_bus);
        let player_id = self.player_id;
        let delay = self.config.auto_hide_delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let hidden = lock(&session).hide_controls_if_playing();
            if hidden {
                event_bus.emit(ControlsHidden::new(player_id));
            }
        });

        let previous = self
            .hide_timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel_hide_timer(&self) {
        if let Some(task) = self
            .hide_timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.detach();
    }
}
