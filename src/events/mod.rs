// src/events/mod.rs
//
// Internal Event System - Public API
//
// CRITICAL: EventHandler is INTERNAL and must NOT be exported

pub mod bus;
pub mod types;

pub use types::DomainEvent;

pub use types::{
    // Catalog
    CommentAdded,
    VideoViewed,
    // Playback
    ControlsHidden,
    ControlsShown,
    FullscreenToggled,
    PlaybackRejected,
    PlaybackToggled,
    // Session
    ProfileUpdated,
    SessionChanged,
};

pub use bus::{EventBus, EventLogEntry, SubscriptionId};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
