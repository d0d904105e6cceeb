use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::profile::{UserProfile, FALLBACK_DISPLAY_NAME};

/// A comment on a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub created_at: DateTime<Utc>,

    /// Author profile, attached after the comments are fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Data needed to post a comment
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub content: String,
    pub video_id: Uuid,
    pub user_id: Uuid,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.user
            .as_ref()
            .map(UserProfile::display_name)
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }
}
