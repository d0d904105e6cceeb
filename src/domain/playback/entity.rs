use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Speeds offered by the player's rate menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum PlaybackRate {
    Quarter,
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    OneAndThreeQuarters,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 8] = [
        PlaybackRate::Quarter,
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::OneAndThreeQuarters,
        PlaybackRate::Double,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Quarter => 0.25,
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::OneAndThreeQuarters => 1.75,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Menu label, e.g. `0.25x`, `1x`
    pub fn label(self) -> String {
        format!("{}x", self.as_f64())
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.as_f64()
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        PlaybackRate::ALL
            .into_iter()
            .find(|rate| (rate.as_f64() - value).abs() < f64::EPSILON)
            .ok_or(DomainError::InvalidPlaybackRate(value))
    }
}

impl std::fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Mutable state of one mounted player.
///
/// `duration`, `current_time` and `buffering` are only written from
/// media element notifications; user intents never touch them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    video_url: String,
    title: String,
    playing: bool,
    current_time: f64,
    duration: Option<f64>,
    volume: f64,
    muted: bool,
    buffering: bool,
    controls_visible: bool,
    playback_rate: PlaybackRate,
}

impl PlaybackSession {
    pub fn new(video_url: impl Into<String>, title: impl Into<String>, auto_play: bool) -> Self {
        Self {
            video_url: video_url.into(),
            title: title.into(),
            playing: auto_play,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
            buffering: false,
            controls_visible: true,
            playback_rate: PlaybackRate::Normal,
        }
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// `None` until the media metadata has loaded
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.playback_rate
    }

    /// Fraction of the media already played, 0 while the duration is unknown
    pub fn progress_fraction(&self) -> f64 {
        match self.duration {
            Some(duration) if duration > 0.0 => (self.current_time / duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Absolute position for a click at `fraction` of the progress bar.
    /// `None` while the duration is unknown.
    pub fn seek_target(&self, fraction: f64) -> Option<f64> {
        if !fraction.is_finite() {
            return None;
        }
        self.duration
            .map(|duration| fraction.clamp(0.0, 1.0) * duration)
    }

    // ------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------

    /// Returns the new value
    pub fn toggle_playing(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Returns the new value. Volume is left as is.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Sets the volume. Zero also mutes; any other value leaves `muted` alone.
    pub fn set_volume(&mut self, volume: f64) -> DomainResult<()> {
        if !volume.is_finite() {
            return Err(DomainError::VolumeOutOfRange(volume));
        }
        self.volume = volume.clamp(0.0, 1.0);
        if self.volume == 0.0 {
            self.muted = true;
        }
        Ok(())
    }

    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.playback_rate = rate;
    }

    /// Returns true if the controls were hidden before
    pub fn show_controls(&mut self) -> bool {
        let was_hidden = !self.controls_visible;
        self.controls_visible = true;
        was_hidden
    }

    /// Hides controls during playback. Returns true if they were visible.
    /// Paused sessions keep their controls.
    pub fn hide_controls_if_playing(&mut self) -> bool {
        if self.playing && self.controls_visible {
            self.controls_visible = false;
            return true;
        }
        false
    }

    /// Playback start was refused by the platform
    pub fn reject_play(&mut self) {
        self.playing = false;
    }

    // ------------------------------------------------------------------
    // Element notifications
    // ------------------------------------------------------------------

    pub fn record_metadata(&mut self, duration: f64) {
        if duration.is_finite() && duration >= 0.0 {
            self.duration = Some(duration);
            self.current_time = self.current_time.min(duration);
        }
    }

    pub fn record_time(&mut self, current_time: f64) {
        if !current_time.is_finite() {
            return;
        }
        let upper = self.duration.unwrap_or(f64::MAX);
        self.current_time = current_time.clamp(0.0, upper);
    }

    pub fn record_waiting(&mut self) {
        self.buffering = true;
    }

    pub fn record_playing(&mut self) {
        self.buffering = false;
    }
}
