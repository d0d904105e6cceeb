use super::entity::ProfileChanges;
use crate::domain::ValidationError;

/// Username cannot be blank
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    Ok(())
}

pub fn validate_profile_changes(changes: &ProfileChanges) -> Result<(), ValidationError> {
    if let Some(username) = &changes.username {
        validate_username(username)?;
    }
    Ok(())
}
