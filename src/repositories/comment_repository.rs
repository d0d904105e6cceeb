// src/repositories/comment_repository.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::rows::{CommentInsert, CommentRow};
use crate::domain::{Comment, NewComment};
use crate::error::{AppError, AppResult};
use crate::integrations::supabase::{SupabaseClient, TableQuery};

const COMMENTS: &str = "comments";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Newest first, without author profiles
    async fn list_by_video(&self, video_id: Uuid) -> AppResult<Vec<Comment>>;

    /// Returns the stored comment
    async fn insert(&self, comment: NewComment) -> AppResult<Comment>;
}

pub struct SupabaseCommentRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseCommentRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommentRepository for SupabaseCommentRepository {
    async fn list_by_video(&self, video_id: Uuid) -> AppResult<Vec<Comment>> {
        let query = TableQuery::new(COMMENTS)
            .select("*")
            .eq("video_id", video_id)
            .order_desc("created_at");
        let rows: Vec<CommentRow> = self.client.select(&query).await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn insert(&self, comment: NewComment) -> AppResult<Comment> {
        let rows: Vec<CommentRow> = self
            .client
            .insert(COMMENTS, &CommentInsert::from(&comment))
            .await?;
        rows.into_iter()
            .next()
            .map(Comment::from)
            .ok_or_else(|| AppError::Other("Backend returned no comment row".to_string()))
    }
}
