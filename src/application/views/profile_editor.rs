// src/application/views/profile_editor.rs
//
// Profile page: view, edit and sign out.
// Nobody signed in (after loading) means redirect to /auth.

use std::sync::Arc;

use crate::application::routes::Route;
use crate::domain::{ProfileChanges, UserProfile};
use crate::services::SessionStore;

pub struct ProfileEditor {
    session_store: Arc<SessionStore>,
    editing: bool,
    pub username: String,
    pub avatar_url: String,
    saving: bool,
    error: Option<String>,
}

impl ProfileEditor {
    pub fn new(session_store: Arc<SessionStore>) -> Self {
        Self {
            session_store,
            editing: false,
            username: String::new(),
            avatar_url: String::new(),
            saving: false,
            error: None,
        }
    }

    /// Where to send the viewer instead of this page, if anywhere
    pub fn redirect(&self) -> Option<Route> {
        let state = self.session_store.snapshot();
        if !state.loading && !state.is_signed_in() {
            Some(Route::Auth)
        } else {
            None
        }
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.session_store.snapshot().profile
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts editing from the held profile
    pub fn begin_edit(&mut self) {
        let profile = self.profile();
        self.username = profile
            .as_ref()
            .map(|p| p.username.clone())
            .unwrap_or_default();
        self.avatar_url = profile
            .and_then(|p| p.avatar_url)
            .unwrap_or_default();
        self.error = None;
        self.editing = true;
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.error = None;
    }

    /// Returns true when the profile was saved
    pub async fn save(&mut self) -> bool {
        let changes = ProfileChanges {
            username: Some(self.username.clone()),
            avatar_url: Some(self.avatar_url.trim().to_string()),
        };

        self.saving = true;
        self.error = None;
        let result = self.session_store.update_profile(changes).await;
        self.saving = false;

        match result {
            Ok(_) => {
                self.editing = false;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    pub async fn sign_out(&mut self) -> Route {
        if let Err(e) = self.session_store.sign_out().await {
            log::warn!("sign out failed: {}", e);
        }
        Route::Catalog { search: None }
    }
}
