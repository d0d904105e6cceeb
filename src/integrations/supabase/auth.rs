// src/integrations/supabase/auth.rs
//
// GoTrue password auth
//
// CRITICAL RULES:
// - The bearer token on the shared REST client always follows the session
// - The session file always follows the session
// - Remote sign-out failures never keep a user signed in locally

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;

use super::client::{read_json, ensure_success, SupabaseClient, AUTH_PREFIX};
use crate::domain::{AuthSession, AuthStateChange, AuthUser, SignUpOutcome};
use crate::error::{AppError, AppResult};
use crate::infrastructure::SessionStorage;
use crate::integrations::auth::AuthBackend;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: uuid::Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for AuthUser {
    fn from(user: UserPayload) -> Self {
        AuthUser {
            id: user.id,
            email: user.email.filter(|email| !email.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserPayload,
}

impl TokenPayload {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|token| !token.is_empty()),
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Sign-up answers with a session when auto-confirm is on, a bare user otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpPayload {
    Session(TokenPayload),
    Wrapped { user: UserPayload },
    User(UserPayload),
}

pub struct GoTrueAuth {
    client: Arc<SupabaseClient>,
    storage: SessionStorage,
    current: RwLock<Option<AuthSession>>,
    changes: broadcast::Sender<AuthStateChange>,
}

impl GoTrueAuth {
    pub fn new(client: Arc<SupabaseClient>, storage: SessionStorage) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            client,
            storage,
            current: RwLock::new(None),
            changes,
        }
    }

    fn current(&self) -> Option<AuthSession> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Installs or removes the session everywhere it is mirrored
    fn install(&self, session: Option<AuthSession>) {
        self.client
            .set_access_token(session.as_ref().map(|s| s.access_token.clone()));

        let persisted = match &session {
            Some(session) => self.storage.save(session),
            None => self.storage.clear(),
        };
        if let Err(e) = persisted {
            log::warn!("could not update session file: {}", e);
        }

        *self.current.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    fn broadcast(&self, change: AuthStateChange) {
        // No receivers is fine
        let _ = self.changes.send(change);
    }

    async fn request_token(&self, grant_type: &str, body: serde_json::Value) -> AppResult<AuthSession> {
        let mut url = self.client.endpoint(&format!("{}token", AUTH_PREFIX))?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .client
            .authorized(self.client.http().post(url))
            .json(&body)
            .send()
            .await?;

        let payload: TokenPayload = read_json(response).await?;
        Ok(payload.into_session(Utc::now()))
    }

    /// Exchanges the refresh token for a new session
    pub async fn refresh_session(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let session = self
            .request_token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;
        self.install(Some(session.clone()));
        self.broadcast(AuthStateChange::TokenRefreshed(session.clone()));
        log::info!("session refreshed for {}", session.user.id);
        Ok(session)
    }

    /// Asks the provider who owns `access_token`
    async fn fetch_user(&self, access_token: &str) -> AppResult<AuthUser> {
        let url = self.client.endpoint(&format!("{}user", AUTH_PREFIX))?;
        let response = self
            .client
            .authorized_as(self.client.http().get(url), access_token)
            .send()
            .await?;
        let user: UserPayload = read_json(response).await?;
        Ok(user.into())
    }

    /// Brings a stored session back to life: refresh if stale, verify otherwise.
    /// A session the provider no longer accepts is dropped.
    async fn restore(&self, stored: AuthSession) -> AppResult<Option<AuthSession>> {
        if stored.is_expired_at(Utc::now()) {
            let Some(refresh_token) = stored.refresh_token.clone() else {
                log::info!("stored session expired without refresh token");
                self.install(None);
                return Ok(None);
            };
            return match self.refresh_session(&refresh_token).await {
                Ok(session) => Ok(Some(session)),
                Err(AppError::Backend { status, message }) if status < 500 => {
                    log::info!("stored session rejected ({}): {}", status, message);
                    self.install(None);
                    Ok(None)
                }
                Err(e) => Err(e),
            };
        }

        match self.fetch_user(&stored.access_token).await {
            Ok(user) => {
                let session = AuthSession { user, ..stored };
                self.install(Some(session.clone()));
                Ok(Some(session))
            }
            Err(AppError::Backend { status, message }) if status < 500 => {
                log::info!("stored session rejected ({}): {}", status, message);
                self.install(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl AuthBackend for GoTrueAuth {
    async fn get_session(&self) -> AppResult<Option<AuthSession>> {
        if let Some(session) = self.current() {
            if !session.is_expired_at(Utc::now()) {
                return Ok(Some(session));
            }
            return self.restore(session).await;
        }

        match self.storage.load()? {
            Some(stored) => self.restore(stored).await,
            None => Ok(None),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: String,
        password: String,
    ) -> AppResult<AuthSession> {
        let session = self
            .request_token("password", json!({ "email": email, "password": password }))
            .await?;

        self.install(Some(session.clone()));
        self.broadcast(AuthStateChange::SignedIn(session.clone()));
        log::info!("signed in as {}", session.user.id);
        Ok(session)
    }

    async fn sign_up(&self, email: String, password: String) -> AppResult<SignUpOutcome> {
        let url = self.client.endpoint(&format!("{}signup", AUTH_PREFIX))?;
        let response = self
            .client
            .authorized(self.client.http().post(url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let outcome = match read_json::<SignUpPayload>(response).await? {
            SignUpPayload::Session(payload) => {
                let session = payload.into_session(Utc::now());
                self.install(Some(session.clone()));
                self.broadcast(AuthStateChange::SignedIn(session.clone()));
                SignUpOutcome {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpPayload::Wrapped { user } | SignUpPayload::User(user) => SignUpOutcome {
                user: user.into(),
                session: None,
            },
        };

        log::info!("account created for {}", outcome.user.id);
        Ok(outcome)
    }

    async fn sign_out(&self) -> AppResult<()> {
        if let Some(session) = self.current() {
            let url = self.client.endpoint(&format!("{}logout", AUTH_PREFIX))?;
            let result = self
                .client
                .authorized_as(self.client.http().post(url), &session.access_token)
                .send()
                .await;

            match result {
                Ok(response) => {
                    if let Err(e) = ensure_success(response).await {
                        log::warn!("remote sign-out failed: {}", e);
                    }
                }
                Err(e) => log::warn!("remote sign-out failed: {}", e),
            }
        }

        self.install(None);
        self.broadcast(AuthStateChange::SignedOut);
        log::info!("signed out");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_payload_prefers_absolute_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let payload: TokenPayload = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "expires_at": 1_704_460_000,
            "user": { "id": "4f1c8d52-0c5e-4f57-9d3c-2f4b8f1e9a11", "email": "viewer@example.com" }
        }))
        .unwrap();

        let session = payload.into_session(now);
        assert_eq!(
            session.expires_at,
            Utc.timestamp_opt(1_704_460_000, 0).single()
        );
        assert_eq!(session.refresh_token.as_deref(), Some("r"));
        assert_eq!(session.user.email.as_deref(), Some("viewer@example.com"));
    }

    #[test]
    fn test_token_payload_falls_back_to_relative_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let payload: TokenPayload = serde_json::from_value(json!({
            "access_token": "a",
            "expires_in": 60,
            "user": { "id": "4f1c8d52-0c5e-4f57-9d3c-2f4b8f1e9a11", "email": "" }
        }))
        .unwrap();

        let session = payload.into_session(now);
        assert_eq!(session.expires_at, Some(now + Duration::seconds(60)));
        assert_eq!(session.refresh_token, None);
        assert_eq!(session.user.email, None);
    }

    #[test]
    fn test_sign_up_payload_shapes() {
        let id = "4f1c8d52-0c5e-4f57-9d3c-2f4b8f1e9a11";

        let confirm_pending: SignUpPayload =
            serde_json::from_value(json!({ "id": id, "email": "new@example.com" })).unwrap();
        assert!(matches!(confirm_pending, SignUpPayload::User(_)));

        let wrapped: SignUpPayload =
            serde_json::from_value(json!({ "user": { "id": id }, "session": null })).unwrap();
        assert!(matches!(wrapped, SignUpPayload::Wrapped { .. }));

        let confirmed: SignUpPayload = serde_json::from_value(json!({
            "access_token": "a",
            "user": { "id": id }
        }))
        .unwrap();
        assert!(matches!(confirmed, SignUpPayload::Session(_)));
    }
}
