use crate::domain::ValidationError;

/// Comment body cannot be blank
pub fn validate_comment_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::CommentEmpty);
    }
    Ok(())
}
