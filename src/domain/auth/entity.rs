use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated account, as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn email_or_default(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}

/// Tokens for a signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

/// Sessions this close to expiry are refreshed before use
const EXPIRY_MARGIN_SECONDS: i64 = 30;

impl AuthSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(EXPIRY_MARGIN_SECONDS) <= now,
            None => false,
        }
    }
}

/// Notification published by the auth backend whenever the session changes
#[derive(Debug, Clone, PartialEq)]
pub enum AuthStateChange {
    SignedIn(AuthSession),
    TokenRefreshed(AuthSession),
    SignedOut,
}

impl AuthStateChange {
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            AuthStateChange::SignedIn(session) | AuthStateChange::TokenRefreshed(session) => {
                Some(session)
            }
            AuthStateChange::SignedOut => None,
        }
    }
}

/// Result of a registration. The session is absent when the provider
/// requires email confirmation before the first sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// Which form the credentials were entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}
