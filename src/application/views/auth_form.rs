// src/application/views/auth_form.rs
//
// Sign-in / sign-up form state.

use std::sync::Arc;

use crate::domain::{AuthMode, Credentials};
use crate::error::AppError;
use crate::services::SessionStore;

pub const SIGN_UP_SUCCESS_MESSAGE: &str = "Account created successfully! You can now log in.";

/// What the page should do after a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Signed in; go to the catalog
    SignedIn,
    /// Account created; form flipped to sign-in mode
    AccountCreated,
    /// Form stays, `message()` explains why
    Failed,
}

pub struct AuthForm {
    session_store: Arc<SessionStore>,
    mode: AuthMode,
    pub email: String,
    pub password: String,
    message: Option<String>,
    submitting: bool,
}

impl AuthForm {
    pub fn new(session_store: Arc<SessionStore>) -> Self {
        Self {
            session_store,
            mode: AuthMode::SignIn,
            email: String::new(),
            password: String::new(),
            message: None,
            submitting: false,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.message = None;
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let credentials = Credentials::new(self.email.clone(), self.password.clone());
        self.submitting = true;
        self.message = None;

        let outcome = match self.mode {
            AuthMode::SignIn => self
                .session_store
                .sign_in(&credentials)
                .await
                .map(|_| SubmitOutcome::SignedIn),
            AuthMode::SignUp => self
                .session_store
                .sign_up(&credentials)
                .await
                .map(|_| SubmitOutcome::AccountCreated),
        };

        self.submitting = false;

        match outcome {
            Ok(SubmitOutcome::AccountCreated) => {
                self.mode = AuthMode::SignIn;
                self.message = Some(SIGN_UP_SUCCESS_MESSAGE.to_string());
                SubmitOutcome::AccountCreated
            }
            Ok(outcome) => outcome,
            Err(e) => {
                self.message = Some(form_message(&e));
                SubmitOutcome::Failed
            }
        }
    }
}

fn form_message(error: &AppError) -> String {
    match error {
        AppError::Validation(validation) => validation.to_string(),
        AppError::Backend { message, .. } => message.clone(),
        other => {
            log::error!("auth submit failed: {}", other);
            "An unexpected error occurred. Please try again.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthSession, AuthUser, SignUpOutcome};
    use crate::events::EventBus;
    use crate::integrations::auth::MockAuthBackend;
    use crate::repositories::MockProfileRepository;
    use uuid::Uuid;

    fn form(auth: MockAuthBackend, profiles: MockProfileRepository) -> AuthForm {
        AuthForm::new(Arc::new(SessionStore::new(
            Arc::new(auth),
            Arc::new(profiles),
            Arc::new(EventBus::new()),
        )))
    }

    #[tokio::test]
    async fn test_invalid_email_shown_inline() {
        let mut auth = MockAuthBackend::new();
        auth.expect_sign_in_with_password().never();

        let mut form = form(auth, MockProfileRepository::new());
        form.email = "nobody".to_string();
        form.password = "secret".to_string();

        assert_eq!(form.submit().await, SubmitOutcome::Failed);
        assert_eq!(form.message(), Some("Please enter a valid email address"));
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_backend_message_shown() {
        let mut auth = MockAuthBackend::new();
        auth.expect_sign_in_with_password().returning(|_, _| {
            Err(AppError::Backend {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })
        });

        let mut form = form(auth, MockProfileRepository::new());
        form.email = "viewer@example.com".to_string();
        form.password = "wrong".to_string();

        assert_eq!(form.submit().await, SubmitOutcome::Failed);
        assert_eq!(form.message(), Some("Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some("viewer@example.com".to_string()),
        };
        let mut auth = MockAuthBackend::new();
        auth.expect_sign_in_with_password().returning(move |_, _| {
            Ok(AuthSession {
                access_token: "token".to_string(),
                refresh_token: None,
                expires_at: None,
                user: user.clone(),
            })
        });
        let mut profiles = MockProfileRepository::new();
        profiles.expect_get_by_id().returning(|_| Ok(None));

        let mut form = form(auth, profiles);
        form.email = "viewer@example.com".to_string();
        form.password = "secret".to_string();

        assert_eq!(form.submit().await, SubmitOutcome::SignedIn);
        assert!(form.message().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_flips_to_sign_in() {
        let mut auth = MockAuthBackend::new();
        auth.expect_sign_up().returning(|email, _| {
            Ok(SignUpOutcome {
                user: AuthUser {
                    id: Uuid::new_v4(),
                    email: Some(email),
                },
                session: None,
            })
        });
        let mut profiles = MockProfileRepository::new();
        profiles.expect_insert().returning(|_| Ok(()));

        let mut form = form(auth, profiles);
        form.toggle_mode();
        assert_eq!(form.mode(), AuthMode::SignUp);
        form.email = "new@example.com".to_string();
        form.password = "secret1".to_string();

        assert_eq!(form.submit().await, SubmitOutcome::AccountCreated);
        assert_eq!(form.mode(), AuthMode::SignIn);
        assert_eq!(form.message(), Some(SIGN_UP_SUCCESS_MESSAGE));
    }

    #[tokio::test]
    async fn test_toggle_clears_message() {
        let mut form = form(MockAuthBackend::new(), MockProfileRepository::new());
        form.submit().await;
        assert_eq!(form.message(), Some("Email is required"));
        form.toggle_mode();
        assert!(form.message().is_none());
    }
}
