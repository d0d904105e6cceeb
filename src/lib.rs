// src/lib.rs
// StreamHub - Video streaming front end over a hosted backend
//
// Architecture:
// - Domain-centric: records, validation and player state live in domain
// - Event-driven: services publish facts on the event bus
// - Explicit: every backend call goes through a repository or auth seam
// - Application layer: views, DTOs and commands for the shell

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod format;
pub mod infrastructure;
pub mod repositories;
pub mod services;

pub mod application;
pub mod integrations;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    AuthMode, AuthSession, AuthStateChange, AuthUser, Comment, Credentials, NewComment,
    PlaybackRate, PlaybackSession, ProfileChanges, SignUpOutcome, UserProfile, ValidationError,
    Video,
};

// ============================================================================
// PUBLIC API - Errors & Config
// ============================================================================

pub use config::AppConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{create_event_bus, DomainEvent, EventBus, EventLogEntry};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    CatalogPage, CommentService, FullscreenHost, MediaElement, MediaEvent, PlaybackController,
    PlayerConfig, SessionState, SessionStore, VideoService,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, Route};

pub use application::commands;
pub use application::dto;
pub use application::views;
