// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - Display fallbacks are applied here, never in the domain records
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::{AuthUser, Comment, PlaybackRate, PlaybackSession, UserProfile, Video};
use crate::format::{format_date, format_duration, format_time};
use crate::services::{CatalogPage, SessionState};

// ============================================================================
// VIDEO DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCardDto {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub created_at: String,
}

impl From<&Video> for VideoCardDto {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.to_string(),
            title: video.title.clone(),
            thumbnail_url: video.thumbnail_or_placeholder().to_string(),
            duration: format_duration(video.duration),
            created_at: format_date(Some(video.created_at)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub poster_url: Option<String>,
    pub duration: String,
    pub created_at: String,
}

impl From<&Video> for VideoDetailDto {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.to_string(),
            title: video.title.clone(),
            description: video.description_or_default().to_string(),
            video_url: video.video_url.clone(),
            poster_url: video.poster_url(),
            duration: format_duration(video.duration),
            created_at: format_date(Some(video.created_at)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPageDto {
    pub page: usize,
    pub videos: Vec<VideoCardDto>,
    pub has_more: bool,
}

impl From<&CatalogPage> for CatalogPageDto {
    fn from(page: &CatalogPage) -> Self {
        Self {
            page: page.page,
            videos: page.videos.iter().map(VideoCardDto::from).collect(),
            has_more: page.has_more,
        }
    }
}

// ============================================================================
// COMMENT DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    pub author: String,
    pub avatar_url: Option<String>,
    pub content: String,
    pub created_at: String,
}

impl From<&Comment> for CommentDto {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            author: comment.author_name().to_string(),
            avatar_url: comment.user.as_ref().and_then(|u| u.avatar_url.clone()),
            content: comment.content.clone(),
            created_at: format_date(Some(comment.created_at)),
        }
    }
}

// ============================================================================
// PROFILE / SESSION DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub join_date: String,
}

impl From<&UserProfile> for ProfileDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            username: profile.display_name().to_string(),
            avatar_url: profile.avatar_url.clone(),
            join_date: format_date(profile.join_date),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub signed_in: bool,
    pub loading: bool,
    pub email: Option<String>,
    pub profile: Option<ProfileDto>,
}

impl From<&SessionState> for SessionDto {
    fn from(state: &SessionState) -> Self {
        Self {
            signed_in: state.is_signed_in(),
            loading: state.loading,
            email: state.user.as_ref().and_then(|u: &AuthUser| u.email.clone()),
            profile: state.profile.as_ref().map(ProfileDto::from),
        }
    }
}

// ============================================================================
// PLAYER DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatusDto {
    pub title: String,
    pub playing: bool,
    pub buffering: bool,
    pub current_time: String,
    pub duration: String,
    pub progress_percent: f64,
    pub volume: f64,
    /// Muted icon is also shown at zero volume
    pub shows_muted_icon: bool,
    pub playback_rate: String,
    pub rates: Vec<String>,
    pub controls_visible: bool,
    /// Title overlay hides together with the controls only while playing
    pub title_visible: bool,
}

impl From<&PlaybackSession> for PlayerStatusDto {
    fn from(session: &PlaybackSession) -> Self {
        Self {
            title: session.title().to_string(),
            playing: session.is_playing(),
            buffering: session.is_buffering(),
            current_time: format_time(session.current_time()),
            duration: format_time(session.duration().unwrap_or(0.0)),
            progress_percent: session.progress_fraction() * 100.0,
            volume: session.volume(),
            shows_muted_icon: session.is_muted() || session.volume() == 0.0,
            playback_rate: session.playback_rate().label(),
            rates: PlaybackRate::ALL.iter().map(|rate| rate.label()).collect(),
            controls_visible: session.controls_visible(),
            title_visible: session.controls_visible() || !session.is_playing(),
        }
    }
}
