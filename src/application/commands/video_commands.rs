// src/application/commands/video_commands.rs

use uuid::Uuid;

use crate::application::dto::{CatalogPageDto, CommentDto, VideoCardDto, VideoDetailDto};
use crate::application::error_handling::ToErrorResponse;
use crate::application::state::AppState;

pub async fn list_videos(
    state: &AppState,
    page: usize,
    search: Option<String>,
) -> Result<CatalogPageDto, String> {
    state
        .video_service
        .list_page(page, search.as_deref())
        .await
        .map(|page| CatalogPageDto::from(&page))
        .to_error_response()
}

pub async fn get_video(state: &AppState, id: Uuid) -> Result<VideoDetailDto, String> {
    state
        .video_service
        .get_video(id)
        .await
        .map(|video| VideoDetailDto::from(&video))
        .to_error_response()
}

pub async fn get_related_videos(state: &AppState, id: Uuid) -> Result<Vec<VideoCardDto>, String> {
    state
        .video_service
        .related_videos(id)
        .await
        .map(|videos| videos.iter().map(VideoCardDto::from).collect())
        .to_error_response()
}

pub async fn list_comments(state: &AppState, video_id: Uuid) -> Result<Vec<CommentDto>, String> {
    state
        .comment_service
        .list_for_video(video_id)
        .await
        .map(|comments| comments.iter().map(CommentDto::from).collect())
        .to_error_response()
}

pub async fn add_comment(
    state: &AppState,
    video_id: Uuid,
    content: String,
) -> Result<CommentDto, String> {
    let user_id = state.session_store.current_user().map(|u| u.id);

    state
        .comment_service
        .add_comment(user_id, video_id, &content)
        .await
        .map(|comment| CommentDto::from(&comment))
        .to_error_response()
}
