// src/services/comment_service.rs
//
// Comment Service - comment thread of one video
//
// CRITICAL RULES:
// - Content is validated before any backend call
// - Only signed-in users may post
// - Author profiles are resolved in one batched lookup
// - A failed author lookup degrades to the fallback name, never to an error

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{validate_comment_content, Comment, NewComment, UserProfile};
use crate::error::{AppError, AppResult};
use crate::events::{CommentAdded, EventBus};
use crate::repositories::{CommentRepository, ProfileRepository};

pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    event_bus: Arc<EventBus>,
}

impl CommentService {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            comment_repo,
            profile_repo,
            event_bus,
        }
    }

    /// Newest first, with author profiles attached where known
    pub async fn list_for_video(&self, video_id: Uuid) -> AppResult<Vec<Comment>> {
        let mut comments = self.comment_repo.list_by_video(video_id).await?;

        let author_ids: Vec<Uuid> = comments
            .iter()
            .map(|c| c.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        if author_ids.is_empty() {
            return Ok(comments);
        }

        let authors: HashMap<Uuid, UserProfile> = match self.profile_repo.list_by_ids(author_ids).await {
            Ok(profiles) => profiles.into_iter().map(|p| (p.id, p)).collect(),
            Err(e) => {
                log::warn!("could not load comment authors for {}: {}", video_id, e);
                HashMap::new()
            }
        };

        for comment in &mut comments {
            comment.user = authors.get(&comment.user_id).cloned();
        }

        Ok(comments)
    }

    pub async fn add_comment(
        &self,
        user_id: Option<Uuid>,
        video_id: Uuid,
        content: &str,
    ) -> AppResult<Comment> {
        validate_comment_content(content)?;
        let user_id = user_id.ok_or(AppError::Unauthenticated)?;

        let mut comment = self
            .comment_repo
            .insert(NewComment {
                content: content.trim().to_string(),
                video_id,
                user_id,
            })
            .await?;

        comment.user = match self.profile_repo.get_by_id(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("could not load profile {}: {}", user_id, e);
                None
            }
        };

        self.event_bus
            .emit(CommentAdded::new(comment.id, video_id, user_id));

        Ok(comment)
    }
}
