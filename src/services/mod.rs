// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod comment_service;
pub mod media_element;
pub mod playback_controller;
pub mod session_store;
pub mod video_service;


pub use comment_service::CommentService;

pub use media_element::{FullscreenHost, MediaElement, MediaEvent};

pub use playback_controller::{PlaybackController, PlayerConfig};

pub use session_store::{SessionState, SessionStore};

pub use video_service::{CatalogPage, VideoService, RELATED_LIMIT};
