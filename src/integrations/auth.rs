// src/integrations/auth.rs
//
// Auth provider seam
//
// CRITICAL RULES:
// - The provider owns the session; callers only observe it
// - Every sign-in, refresh and sign-out is broadcast to subscribers

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{AuthSession, AuthStateChange, SignUpOutcome};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Session restored from a previous run, if still valid
    async fn get_session(&self) -> AppResult<Option<AuthSession>>;

    async fn sign_in_with_password(&self, email: String, password: String)
        -> AppResult<AuthSession>;

    /// The returned session is absent when the provider requires email confirmation
    async fn sign_up(&self, email: String, password: String) -> AppResult<SignUpOutcome>;

    async fn sign_out(&self) -> AppResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange>;
}
