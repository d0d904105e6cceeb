// src/application/views/comment_thread.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Comment;
use crate::services::{CommentService, SessionStore};

/// Comments under one video, newest first
pub struct CommentThread {
    comment_service: Arc<CommentService>,
    session_store: Arc<SessionStore>,
    video_id: Uuid,
    comments: Vec<Comment>,
    pub draft: String,
    posting: bool,
    error: Option<String>,
}

impl CommentThread {
    pub fn new(
        comment_service: Arc<CommentService>,
        session_store: Arc<SessionStore>,
        video_id: Uuid,
    ) -> Self {
        Self {
            comment_service,
            session_store,
            video_id,
            comments: Vec::new(),
            draft: String::new(),
            posting: false,
            error: None,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_posting(&self) -> bool {
        self.posting
    }

    /// Only signed-in viewers get the compose box
    pub fn can_post(&self) -> bool {
        self.session_store.snapshot().is_signed_in()
    }

    pub async fn load(&mut self) {
        match self.comment_service.list_for_video(self.video_id).await {
            Ok(comments) => {
                self.comments = comments;
                self.error = None;
            }
            Err(e) => {
                log::warn!("comments for {} failed to load: {}", self.video_id, e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Posts the draft; the new comment goes to the top
    pub async fn post(&mut self) -> bool {
        let user_id = self.session_store.current_user().map(|u| u.id);

        self.posting = true;
        self.error = None;
        let result = self
            .comment_service
            .add_comment(user_id, self.video_id, &self.draft)
            .await;
        self.posting = false;

        match result {
            Ok(comment) => {
                self.comments.insert(0, comment);
                self.draft.clear();
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}
