use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown in catalog cards when the backend has no thumbnail for a video
pub const PLACEHOLDER_THUMBNAIL: &str = "/assets/video-placeholder.jpg";

/// A published video as held by the front end.
/// Read-only copy of a backend `videos` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,

    pub title: String,

    /// Absent when the backend row has no (or an empty) description
    pub description: Option<String>,

    /// Length in seconds
    pub duration: f64,

    pub thumbnail_url: Option<String>,

    pub video_url: String,

    /// Uploader, if recorded
    pub user_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Video {
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn thumbnail_or_placeholder(&self) -> &str {
        self.thumbnail_url.as_deref().unwrap_or(PLACEHOLDER_THUMBNAIL)
    }

    /// Poster frame served by the video host, keyed by the last path
    /// segment of the playback URL.
    pub fn poster_url(&self) -> Option<String> {
        let asset = self
            .video_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())?;
        Some(format!("https://image.mux.com/{}/thumbnail.jpg", asset))
    }

    /// Case-insensitive substring match used by catalog search
    pub fn title_contains(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(&term.to_lowercase())
    }
}
