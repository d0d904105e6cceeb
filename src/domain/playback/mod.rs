pub mod entity;
pub mod invariants;

pub use entity::{PlaybackRate, PlaybackSession};
pub use invariants::validate_playback_session;
