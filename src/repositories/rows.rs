// src/repositories/rows.rs
//
// Backend row shapes and their mapping to domain records.
//
// CRITICAL RULES:
// - Column names match the hosted schema exactly (snake_case)
// - Empty strings are absent values, never "present but empty"

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Comment, NewComment, UserProfile, Video};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts a number, a numeric string or null
fn lenient_seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let seconds = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if seconds.is_finite() && seconds >= 0.0 { seconds } else { 0.0 })
}

/// Accepts a UUID, an empty string or null
fn lenient_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_empty(value).and_then(|s| Uuid::parse_str(&s).ok()))
}

// ============================================================================
// videos
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration: f64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub video_url: String,
    #[serde(default, deserialize_with = "lenient_uuid")]
    pub user_id: Option<Uuid>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            title: row.title,
            description: non_empty(row.description),
            duration: row.duration,
            thumbnail_url: non_empty(row.thumbnail_url),
            video_url: row.video_url,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

// ============================================================================
// comments
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub user_id: Uuid,
    pub video_id: Uuid,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            content: row.content,
            user_id: row.user_id,
            video_id: row.video_id,
            created_at: row.created_at,
            user: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentInsert<'a> {
    pub content: &'a str,
    pub video_id: Uuid,
    pub user_id: Uuid,
}

impl<'a> From<&'a NewComment> for CommentInsert<'a> {
    fn from(comment: &'a NewComment) -> Self {
        CommentInsert {
            content: &comment.content,
            video_id: comment.video_id,
            user_id: comment.user_id,
        }
    }
}

// ============================================================================
// profiles
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            id: row.id,
            username: row.username.unwrap_or_default(),
            avatar_url: non_empty(row.avatar_url),
            join_date: row.join_date,
        }
    }
}

/// New profile row; a missing avatar is stored as an empty string
#[derive(Debug, Serialize)]
pub struct ProfileInsert<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub avatar_url: &'a str,
    pub join_date: Option<DateTime<Utc>>,
}

impl<'a> From<&'a UserProfile> for ProfileInsert<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        ProfileInsert {
            id: profile.id,
            username: &profile.username,
            avatar_url: profile.avatar_url.as_deref().unwrap_or(""),
            join_date: profile.join_date,
        }
    }
}

/// Partial update; absent fields are left untouched by the backend
#[derive(Debug, Serialize)]
pub struct ProfilePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
