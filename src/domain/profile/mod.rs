pub mod entity;
pub mod invariants;

pub use entity::{username_from_email, ProfileChanges, UserProfile, FALLBACK_DISPLAY_NAME};
pub use invariants::{validate_profile_changes, validate_username};
