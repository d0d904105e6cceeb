// src/services/session_store.rs
//
// Session Store - process-wide signed-in user and profile
//
// CRITICAL RULES:
// - Initialized once at startup, shut down once at exit
// - Single writer: only the store's operations and its auth subscription mutate state
// - Readers get snapshots
// - A profile fetch only lands if nothing was written while it ran
// - Validation happens before any backend call
// - Every state change is published as SessionChanged

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::{
    validate_credentials, validate_profile_changes, AuthMode, AuthSession, AuthStateChange,
    AuthUser, Credentials, ProfileChanges, SignUpOutcome, UserProfile,
};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, ProfileUpdated, SessionChanged};
use crate::integrations::AuthBackend;
use crate::repositories::ProfileRepository;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub profile: Option<UserProfile>,
    /// True until the first session lookup finished
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            profile: None,
            loading: true,
        }
    }
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// State shared with the subscription task
struct Shared {
    profile_repo: Arc<dyn ProfileRepository>,
    event_bus: Arc<EventBus>,
    state: RwLock<SessionState>,
    /// Bumped on every write, under the state lock
    revision: AtomicU64,
}

impl Shared {
    fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn snapshot_with_revision(&self) -> (SessionState, u64) {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        (state.clone(), self.revision.load(Ordering::SeqCst))
    }

    fn write<F>(&self, change: F)
    where
        F: FnOnce(&mut SessionState),
    {
        self.commit(None, change);
    }

    /// Applies `change` only if the state is still at `revision`
    fn write_if_unchanged<F>(&self, revision: u64, change: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        self.commit(Some(revision), change)
    }

    fn commit<F>(&self, expected: Option<u64>, change: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        let state = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            if let Some(expected) = expected {
                if self.revision.load(Ordering::SeqCst) != expected {
                    return false;
                }
            }
            change(&mut state);
            self.revision.fetch_add(1, Ordering::SeqCst);
            state.clone()
        };
        self.event_bus.emit(SessionChanged::new(
            state.user.as_ref().map(|u| u.id),
            state.profile.is_some(),
            state.loading,
        ));
        true
    }

    /// Mirrors a session (or its absence) into the state, loading the
    /// profile when the user changed
    async fn apply_session(&self, session: Option<&AuthSession>) {
        let Some(session) = session else {
            self.write(|state| {
                state.user = None;
                state.profile = None;
                state.loading = false;
            });
            return;
        };

        let user = session.user.clone();
        let (current, revision) = self.snapshot_with_revision();
        let same_user = current.user.as_ref().map(|u| u.id) == Some(user.id);

        if same_user && current.profile.is_some() {
            self.write(|state| {
                state.user = Some(user);
                state.loading = false;
            });
            return;
        }

        let profile = match self.profile_repo.get_by_id(user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("could not load profile for {}: {}", user.id, e);
                None
            }
        };

        let user_id = user.id;
        let applied = self.write_if_unchanged(revision, |state| {
            state.user = Some(user);
            state.profile = profile;
            state.loading = false;
        });
        if !applied {
            log::debug!("dropping stale profile fetch for {}", user_id);
        }
    }

    async fn handle_change(&self, change: AuthStateChange) {
        log::debug!("auth state changed, signed in: {}", change.session().is_some());
        self.apply_session(change.session()).await;
    }
}

pub struct SessionStore {
    auth: Arc<dyn AuthBackend>,
    shared: Arc<Shared>,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        profile_repo: Arc<dyn ProfileRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            auth,
            shared: Arc::new(Shared {
                profile_repo,
                event_bus,
                state: RwLock::new(SessionState::default()),
                revision: AtomicU64::new(0),
            }),
            subscription: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.snapshot()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.snapshot().user
    }

    /// Subscribes to auth changes and restores any existing session.
    /// Calling it again does nothing.
    pub async fn initialize(&self) {
        {
            let mut subscription = self.subscription.lock().unwrap_or_else(|e| e.into_inner());
            if subscription.is_some() {
                return;
            }
            *subscription = Some(self.spawn_subscription(self.auth.subscribe()));
        }

        match self.auth.get_session().await {
            Ok(session) => self.shared.apply_session(session.as_ref()).await,
            Err(e) => {
                log::warn!("could not restore session: {}", e);
                self.shared.apply_session(None).await;
            }
        }
    }

    fn spawn_subscription(&self, mut changes: broadcast::Receiver<AuthStateChange>) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => shared.handle_change(change).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("missed {} auth changes", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Releases the auth subscription
    pub fn shutdown(&self) {
        if let Some(task) = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> AppResult<()> {
        validate_credentials(credentials, AuthMode::SignIn)?;

        let session = self
            .auth
            .sign_in_with_password(credentials.email.clone(), credentials.password.clone())
            .await?;

        self.shared.apply_session(Some(&session)).await;
        Ok(())
    }

    /// Creates the account and its profile row
    pub async fn sign_up(&self, credentials: &Credentials) -> AppResult<SignUpOutcome> {
        validate_credentials(credentials, AuthMode::SignUp)?;

        let outcome = self
            .auth
            .sign_up(credentials.email.clone(), credentials.password.clone())
            .await?;

        let profile = UserProfile::for_new_account(outcome.user.id, &credentials.email);
        self.shared.profile_repo.insert(profile.clone()).await?;

        if let Some(session) = &outcome.session {
            let user = session.user.clone();
            self.shared.write(|state| {
                state.user = Some(user);
                state.profile = Some(profile);
                state.loading = false;
            });
        }

        Ok(outcome)
    }

    /// Local state is cleared even if the provider call fails
    pub async fn sign_out(&self) -> AppResult<()> {
        let result = self.auth.sign_out().await;
        self.shared.apply_session(None).await;
        result
    }

    /// Saves profile changes for the signed-in user and returns the merged profile
    pub async fn update_profile(&self, changes: ProfileChanges) -> AppResult<UserProfile> {
        let user = self.current_user().ok_or(AppError::Unauthenticated)?;
        validate_profile_changes(&changes)?;

        self.shared
            .profile_repo
            .update(user.id, changes.clone())
            .await?;

        let held = self.snapshot().profile;
        let updated = match held {
            Some(mut profile) => {
                profile.apply(&changes);
                profile
            }
            None => self
                .shared
                .profile_repo
                .get_by_id(user.id)
                .await?
                .ok_or(AppError::NotFound)?,
        };

        let stored = updated.clone();
        self.shared.write(|state| {
            if state.user.as_ref().map(|u| u.id) == Some(user.id) {
                state.profile = Some(stored);
            }
        });
        self.shared.event_bus.emit(ProfileUpdated::new(user.id));

        Ok(updated)
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use crate::integrations::auth::MockAuthBackend;
    use crate::repositories::MockProfileRepository;
    use async_trait::async_trait;
    use tokio::sync::Notify;
    use uuid::Uuid;

    fn user(email: &str) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        }
    }

    fn session_for(user: &AuthUser) -> AuthSession {
        AuthSession {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
            user: user.clone(),
        }
    }

    fn profile_for(user: &AuthUser, username: &str) -> UserProfile {
        UserProfile {
            id: user.id,
            username: username.to_string(),
            avatar_url: None,
            join_date: None,
        }
    }

    /// Auth mock wired to a test-owned change channel
    fn auth_with_channel() -> (MockAuthBackend, broadcast::Sender<AuthStateChange>) {
        let (tx, _) = broadcast::channel(8);
        let mut auth = MockAuthBackend::new();
        let sender = tx.clone();
        auth.expect_subscribe().returning(move || sender.subscribe());
        (auth, tx)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let store = SessionStore::new(
            Arc::new(MockAuthBackend::new()),
            Arc::new(MockProfileRepository::new()),
            Arc::new(EventBus::new()),
        );
        let state = store.snapshot();
        assert!(state.loading);
        assert!(!state.is_signed_in());
    }

    #[tokio::test]
    async fn test_initialize_restores_session_and_profile() {
        let viewer = user("viewer@example.com");
        let (mut auth, _tx) = auth_with_channel();
        let restored = session_for(&viewer);
        auth.expect_get_session()
            .times(1)
            .returning(move || Ok(Some(restored.clone())));

        let mut profiles = MockProfileRepository::new();
        let profile = profile_for(&viewer, "viewer");
        profiles
            .expect_get_by_id()
            .returning(move |_| Ok(Some(profile.clone())));

        let store = SessionStore::new(Arc::new(auth), Arc::new(profiles), Arc::new(EventBus::new()));
        store.initialize().await;
        store.initialize().await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.user, Some(viewer));
        assert_eq!(state.profile.unwrap().username, "viewer");
    }

    #[tokio::test]
    async fn test_initialize_without_session() {
        let (mut auth, _tx) = auth_with_channel();
        auth.expect_get_session().returning(|| Ok(None));

        let bus = Arc::new(EventBus::new());
        let store = SessionStore::new(Arc::new(auth), Arc::new(MockProfileRepository::new()), Arc::clone(&bus));
        store.initialize().await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert!(state.user.is_none());
        assert_eq!(bus.get_event_log().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_failure_counts_as_signed_out() {
        let (mut auth, _tx) = auth_with_channel();
        auth.expect_get_session().returning(|| {
            Err(AppError::Backend {
                status: 503,
                message: "down".to_string(),
            })
        });

        let store = SessionStore::new(
            Arc::new(auth),
            Arc::new(MockProfileRepository::new()),
            Arc::new(EventBus::new()),
        );
        store.initialize().await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert!(!state.is_signed_in());
    }

    #[tokio::test]
    async fn test_subscription_follows_sign_out() {
        let viewer = user("viewer@example.com");
        let (mut auth, tx) = auth_with_channel();
        let restored = session_for(&viewer);
        auth.expect_get_session()
            .returning(move || Ok(Some(restored.clone())));

        let mut profiles = MockProfileRepository::new();
        let profile = profile_for(&viewer, "viewer");
        profiles
            .expect_get_by_id()
            .returning(move |_| Ok(Some(profile.clone())));

        let store = SessionStore::new(Arc::new(auth), Arc::new(profiles), Arc::new(EventBus::new()));
        store.initialize().await;
        assert!(store.snapshot().is_signed_in());

        tx.send(AuthStateChange::SignedOut).unwrap();
        settle().await;

        let state = store.snapshot();
        assert!(state.user.is_none());
        assert!(state.profile.is_none());
    }

    /// Holds every profile lookup until released
    struct GatedProfiles {
        profile: UserProfile,
        gate: Notify,
    }

    #[async_trait]
    impl ProfileRepository for GatedProfiles {
        async fn get_by_id(&self, _id: Uuid) -> AppResult<Option<UserProfile>> {
            self.gate.notified().await;
            Ok(Some(self.profile.clone()))
        }

        async fn list_by_ids(&self, _ids: Vec<Uuid>) -> AppResult<Vec<UserProfile>> {
            Ok(vec![self.profile.clone()])
        }

        async fn insert(&self, _profile: UserProfile) -> AppResult<()> {
            Ok(())
        }

        async fn update(&self, _id: Uuid, _changes: ProfileChanges) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sign_out_wins_over_slow_profile_fetch() {
        let viewer = user("viewer@example.com");
        let (mut auth, tx) = auth_with_channel();
        auth.expect_get_session().returning(|| Ok(None));
        auth.expect_sign_out().returning(|| Ok(()));

        let profiles = Arc::new(GatedProfiles {
            profile: profile_for(&viewer, "viewer"),
            gate: Notify::new(),
        });
        let store = SessionStore::new(Arc::new(auth), profiles.clone(), Arc::new(EventBus::new()));
        store.initialize().await;

        tx.send(AuthStateChange::SignedIn(session_for(&viewer))).unwrap();
        settle().await;

        store.sign_out().await.unwrap();
        assert!(!store.snapshot().is_signed_in());

        profiles.gate.notify_one();
        settle().await;

        let state = store.snapshot();
        assert!(!state.is_signed_in());
        assert!(state.profile.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_releases_subscription() {
        let (mut auth, tx) = auth_with_channel();
        auth.expect_get_session().returning(|| Ok(None));

        let store = SessionStore::new(
            Arc::new(auth),
            Arc::new(MockProfileRepository::new()),
            Arc::new(EventBus::new()),
        );
        store.initialize().await;
        settle().await;
        assert_eq!(tx.receiver_count(), 1);

        store.shutdown();
        settle().await;
        assert_eq!(tx.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_validates_before_calling_backend() {
        let mut auth = MockAuthBackend::new();
        auth.expect_sign_in_with_password().never();

        let store = SessionStore::new(
            Arc::new(auth),
            Arc::new(MockProfileRepository::new()),
            Arc::new(EventBus::new()),
        );

        let cases = [
            (Credentials::new("", "secret"), ValidationError::EmailRequired),
            (Credentials::new("not-an-email", "secret"), ValidationError::EmailInvalid),
            (Credentials::new("viewer@example.com", ""), ValidationError::PasswordRequired),
        ];
        for (credentials, expected) in cases {
            match store.sign_in(&credentials).await {
                Err(AppError::Validation(actual)) => assert_eq!(actual, expected),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_sign_in_loads_profile() {
        let viewer = user("viewer@example.com");
        let mut auth = MockAuthBackend::new();
        let session = session_for(&viewer);
        auth.expect_sign_in_with_password()
            .withf(|email, password| email == "viewer@example.com" && password == "secret")
            .returning(move |_, _| Ok(session.clone()));

        let mut profiles = MockProfileRepository::new();
        let profile = profile_for(&viewer, "viewer");
        profiles
            .expect_get_by_id()
            .times(1)
            .returning(move |_| Ok(Some(profile.clone())));

        let store = SessionStore::new(Arc::new(auth), Arc::new(profiles), Arc::new(EventBus::new()));
        store
            .sign_in(&Credentials::new("viewer@example.com", "secret"))
            .await
            .unwrap();

        let state = store.snapshot();
        assert_eq!(state.user, Some(viewer));
        assert!(state.profile.is_some());
    }

    #[tokio::test]
    async fn test_sign_in_error_leaves_state() {
        let mut auth = MockAuthBackend::new();
        auth.expect_sign_in_with_password().returning(|_, _| {
            Err(AppError::Backend {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })
        });

        let store = SessionStore::new(
            Arc::new(auth),
            Arc::new(MockProfileRepository::new()),
            Arc::new(EventBus::new()),
        );

        let result = store
            .sign_in(&Credentials::new("viewer@example.com", "wrong"))
            .await;
        assert!(matches!(result, Err(AppError::Backend { status: 400, .. })));
        assert!(!store.snapshot().is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_up_requires_six_characters() {
        let mut auth = MockAuthBackend::new();
        auth.expect_sign_up().never();

        let store = SessionStore::new(
            Arc::new(auth),
            Arc::new(MockProfileRepository::new()),
            Arc::new(EventBus::new()),
        );

        let result = store
            .sign_up(&Credentials::new("new@example.com", "12345"))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::PasswordTooShort { min: 6 }))
        ));
    }

    #[tokio::test]
    async fn test_sign_up_provisions_profile() {
        let created = user("new.viewer@example.com");
        let created_id = created.id;

        let mut auth = MockAuthBackend::new();
        let pending = created.clone();
        auth.expect_sign_up().returning(move |_, _| {
            Ok(SignUpOutcome {
                user: pending.clone(),
                session: None,
            })
        });

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_insert()
            .times(1)
            .withf(move |profile| {
                profile.id == created_id
                    && profile.username == "new.viewer"
                    && profile.avatar_url.is_none()
                    && profile.join_date.is_some()
            })
            .returning(|_| Ok(()));

        let store = SessionStore::new(Arc::new(auth), Arc::new(profiles), Arc::new(EventBus::new()));
        let outcome = store
            .sign_up(&Credentials::new("new.viewer@example.com", "secret1"))
            .await
            .unwrap();

        assert!(outcome.session.is_none());
        assert!(!store.snapshot().is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_on_failure() {
        let viewer = user("viewer@example.com");
        let mut auth = MockAuthBackend::new();
        let session = session_for(&viewer);
        auth.expect_sign_in_with_password()
            .returning(move |_, _| Ok(session.clone()));
        auth.expect_sign_out().returning(|| {
            Err(AppError::Backend {
                status: 500,
                message: "logout failed".to_string(),
            })
        });

        let mut profiles = MockProfileRepository::new();
        profiles.expect_get_by_id().returning(|_| Ok(None));

        let store = SessionStore::new(Arc::new(auth), Arc::new(profiles), Arc::new(EventBus::new()));
        store
            .sign_in(&Credentials::new("viewer@example.com", "secret"))
            .await
            .unwrap();

        assert!(store.sign_out().await.is_err());
        assert!(!store.snapshot().is_signed_in());
    }

    #[tokio::test]
    async fn test_update_profile_requires_user() {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_update().never();

        let store = SessionStore::new(
            Arc::new(MockAuthBackend::new()),
            Arc::new(profiles),
            Arc::new(EventBus::new()),
        );

        let result = store
            .update_profile(ProfileChanges {
                username: Some("renamed".to_string()),
                avatar_url: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_update_profile_merges_changes() {
        let viewer = user("viewer@example.com");
        let mut auth = MockAuthBackend::new();
        let session = session_for(&viewer);
        auth.expect_sign_in_with_password()
            .returning(move |_, _| Ok(session.clone()));

        let mut profiles = MockProfileRepository::new();
        let profile = profile_for(&viewer, "viewer");
        profiles
            .expect_get_by_id()
            .returning(move |_| Ok(Some(profile.clone())));
        profiles
            .expect_update()
            .times(1)
            .returning(|_, _| Ok(()));

        let bus = Arc::new(EventBus::new());
        let store = SessionStore::new(Arc::new(auth), Arc::new(profiles), Arc::clone(&bus));
        store
            .sign_in(&Credentials::new("viewer@example.com", "secret"))
            .await
            .unwrap();

        let updated = store
            .update_profile(ProfileChanges {
                username: Some("renamed".to_string()),
                avatar_url: Some("https://cdn.example.com/a.png".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(updated.username, "renamed");
        assert_eq!(store.snapshot().profile, Some(updated));
        assert!(bus
            .get_event_log()
            .iter()
            .any(|entry| entry.event_type == "ProfileUpdated"));
    }

    #[tokio::test]
    async fn test_blank_username_rejected() {
        let viewer = user("viewer@example.com");
        let mut auth = MockAuthBackend::new();
        let session = session_for(&viewer);
        auth.expect_sign_in_with_password()
            .returning(move |_, _| Ok(session.clone()));

        let mut profiles = MockProfileRepository::new();
        profiles.expect_get_by_id().returning(|_| Ok(None));
        profiles.expect_update().never();

        let store = SessionStore::new(Arc::new(auth), Arc::new(profiles), Arc::new(EventBus::new()));
        store
            .sign_in(&Credentials::new("viewer@example.com", "secret"))
            .await
            .unwrap();

        let result = store
            .update_profile(ProfileChanges {
                username: Some("  ".to_string()),
                avatar_url: None,
            })
            .await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::UsernameEmpty))
        ));
    }
}
