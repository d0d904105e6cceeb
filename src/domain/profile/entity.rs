use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name used wherever a profile (or its username) is missing
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Public profile of a registered user.
/// Shares its id with the auth user it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,

    pub username: String,

    pub avatar_url: Option<String>,

    pub join_date: Option<DateTime<Utc>>,
}

/// Partial update of a profile. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Profile provisioned for a freshly registered account
    pub fn for_new_account(user_id: Uuid, email: &str) -> Self {
        Self {
            id: user_id,
            username: username_from_email(email),
            avatar_url: None,
            join_date: Some(Utc::now()),
        }
    }

    /// Merge a successful update into the held copy
    pub fn apply(&mut self, changes: &ProfileChanges) {
        if let Some(username) = &changes.username {
            self.username = username.clone();
        }
        if let Some(avatar_url) = &changes.avatar_url {
            self.avatar_url = if avatar_url.trim().is_empty() {
                None
            } else {
                Some(avatar_url.clone())
            };
        }
    }

    pub fn display_name(&self) -> &str {
        if self.username.trim().is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            &self.username
        }
    }
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.avatar_url.is_none()
    }
}

/// Local part of an email address, used as the initial username
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_profile() {
        let id = Uuid::new_v4();
        let profile = UserProfile::for_new_account(id, "ada@example.com");
        assert_eq!(profile.id, id);
        assert_eq!(profile.username, "ada");
        assert!(profile.avatar_url.is_none());
        assert!(profile.join_date.is_some());
    }

    #[test]
    fn test_apply_partial_changes() {
        let mut profile = UserProfile::for_new_account(Uuid::new_v4(), "ada@example.com");
        profile.apply(&ProfileChanges {
            username: Some("lovelace".to_string()),
            avatar_url: None,
        });
        assert_eq!(profile.username, "lovelace");
        assert!(profile.avatar_url.is_none());

        profile.apply(&ProfileChanges {
            username: None,
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
        });
        assert_eq!(profile.username, "lovelace");
        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );

        profile.apply(&ProfileChanges {
            username: None,
            avatar_url: Some(String::new()),
        });
        assert!(profile.avatar_url.is_none());
    }

    #[test]
    fn test_display_name_fallback() {
        let mut profile = UserProfile::for_new_account(Uuid::new_v4(), "@example.com");
        assert_eq!(profile.display_name(), FALLBACK_DISPLAY_NAME);
        profile.username = "grace".to_string();
        assert_eq!(profile.display_name(), "grace");
    }
}
