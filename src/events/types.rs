// src/events/types.rs
//
// All events in the system.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all events must implement
pub trait DomainEvent: std::fmt::Debug + Clone + Send + Sync {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! domain_event {
    ($name:ident) => {
        impl DomainEvent for $name {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &'static str {
                stringify!($name)
            }
        }
    };
}

// ============================================================================
// SESSION EVENTS
// ============================================================================

/// Emitted whenever the session store changes user, profile or loading state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub has_profile: bool,
    pub loading: bool,
}

impl SessionChanged {
    pub fn new(user_id: Option<Uuid>, has_profile: bool, loading: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_id,
            has_profile,
            loading,
        }
    }
}

domain_event!(SessionChanged);

/// Emitted after a profile update was accepted by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl ProfileUpdated {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_id,
        }
    }
}

domain_event!(ProfileUpdated);

// ============================================================================
// CATALOG EVENTS
// ============================================================================

/// Emitted when a video page is opened and its view counter bump is sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoViewed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub video_id: Uuid,
}

impl VideoViewed {
    pub fn new(video_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            video_id,
        }
    }
}

domain_event!(VideoViewed);

/// Emitted after a comment was stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub comment_id: Uuid,
    pub video_id: Uuid,
    pub user_id: Uuid,
}

impl CommentAdded {
    pub fn new(comment_id: Uuid, video_id: Uuid, user_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            comment_id,
            video_id,
            user_id,
        }
    }
}

domain_event!(CommentAdded);

// ============================================================================
// PLAYBACK EVENTS
// ============================================================================

/// Emitted when the user toggles play/pause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackToggled {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub player_id: Uuid,
    pub playing: bool,
}

impl PlaybackToggled {
    pub fn new(player_id: Uuid, playing: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            player_id,
            playing,
        }
    }
}

domain_event!(PlaybackToggled);

/// Emitted when the platform refused to start playback.
/// The player has already fallen back to paused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackRejected {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub player_id: Uuid,
    pub reason: String,
}

impl PlaybackRejected {
    pub fn new(player_id: Uuid, reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            player_id,
            reason,
        }
    }
}

domain_event!(PlaybackRejected);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsShown {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub player_id: Uuid,
}

impl ControlsShown {
    pub fn new(player_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            player_id,
        }
    }
}

domain_event!(ControlsShown);

/// Emitted by the auto-hide countdown or by the pointer leaving the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsHidden {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub player_id: Uuid,
}

impl ControlsHidden {
    pub fn new(player_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            player_id,
        }
    }
}

domain_event!(ControlsHidden);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullscreenToggled {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub player_id: Uuid,
    pub fullscreen: bool,
}

impl FullscreenToggled {
    pub fn new(player_id: Uuid, fullscreen: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            player_id,
            fullscreen,
        }
    }
}

domain_event!(FullscreenToggled);
