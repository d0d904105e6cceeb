// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod auth;
pub mod comment;
pub mod playback;
pub mod profile;
pub mod video;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Auth Domain
pub use auth::{
    validate_credentials, AuthMode, AuthSession, AuthStateChange, AuthUser, Credentials,
    SignUpOutcome, MIN_PASSWORD_LENGTH,
};

// Comment Domain
pub use comment::{validate_comment_content, Comment, NewComment};

// Playback Domain
pub use playback::{validate_playback_session, PlaybackRate, PlaybackSession};

// Profile Domain
pub use profile::{
    username_from_email, validate_profile_changes, validate_username, ProfileChanges,
    UserProfile, FALLBACK_DISPLAY_NAME,
};

// Video Domain
pub use video::{Video, PLACEHOLDER_THUMBNAIL};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Playback rate {0} is not offered")]
    InvalidPlaybackRate(f64),

    #[error("Volume {0} is outside [0, 1]")]
    VolumeOutOfRange(f64),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

/// User input rejected before any backend call.
/// Display strings are shown inline next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    EmailInvalid,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Username cannot be empty")]
    UsernameEmpty,

    #[error("Comment cannot be empty")]
    CommentEmpty,
}
