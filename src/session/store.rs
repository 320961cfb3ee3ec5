use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::api::types::{LoginRequest, LoginResponse, SessionUser};
use crate::error::{ClientError, ClientResult};
use crate::tprintln;

use super::storage::{SharedStorage, LEGACY_TOKEN_KEY, TOKEN_KEY, USER_KEY};

/// Where `logout` sends the user.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
    pub is_loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool { self.token.is_some() && self.user.is_some() }
    pub fn is_admin(&self) -> bool { self.user.as_ref().map(|u| u.is_admin).unwrap_or(false) }
}

pub type SessionObserver = Arc<dyn Fn(&SessionState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Current user and token, held in memory and mirrored to persistent storage.
///
/// Overlapping `login` / `logout` / `get_profile` calls are not serialized; whichever
/// finishes last decides the state. Locks are never held across an await.
pub struct SessionStore {
    auth: AuthApi,
    storage: SharedStorage,
    state: RwLock<SessionState>,
    observers: RwLock<Vec<(ObserverId, SessionObserver)>>,
    next_observer: AtomicU64,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.read();
        f.debug_struct("SessionStore")
            .field("authenticated", &s.is_authenticated())
            .field("user", &s.user.as_ref().map(|u| u.username.as_str()))
            .finish()
    }
}

impl SessionStore {
    pub fn new(auth: AuthApi, storage: SharedStorage) -> Self {
        Self {
            auth,
            storage,
            state: RwLock::new(SessionState::default()),
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> SessionState { self.state.read().clone() }
    pub fn token(&self) -> Option<String> { self.state.read().token.clone() }
    pub fn user(&self) -> Option<SessionUser> { self.state.read().user.clone() }
    pub fn is_loading(&self) -> bool { self.state.read().is_loading }
    pub fn is_authenticated(&self) -> bool { self.state.read().is_authenticated() }
    pub fn is_admin(&self) -> bool { self.state.read().is_admin() }
    pub fn storage(&self) -> &SharedStorage { &self.storage }

    /// Registers a callback invoked with a snapshot after every state change.
    pub fn on_change(&self, observer: impl Fn(&SessionState) + Send + Sync + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut obs = self.observers.write();
        let before = obs.len();
        obs.retain(|(i, _)| *i != id);
        obs.len() != before
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        let snap = {
            let mut s = self.state.write();
            f(&mut s);
            s.clone()
        };
        let observers: Vec<SessionObserver> = self.observers.read().iter().map(|(_, o)| o.clone()).collect();
        for o in observers {
            o(&snap);
        }
    }

    fn set_loading(&self, loading: bool) { self.update(|s| s.is_loading = loading); }

    /// Stores the session in memory and persists it under both token keys.
    pub fn set_auth(&self, token: &str, user: SessionUser) {
        self.persist_token(token);
        self.persist_user(&user);
        self.update(|s| {
            s.token = Some(token.to_string());
            s.user = Some(user);
        });
    }

    /// Forgets the session in memory and in storage.
    pub fn clear_auth(&self) {
        for key in [TOKEN_KEY, LEGACY_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(target: "openphotobox::session", "failed to remove '{}' from storage: {}", key, e);
            }
        }
        self.update(|s| {
            s.token = None;
            s.user = None;
        });
    }

    fn persist_token(&self, token: &str) {
        for key in [TOKEN_KEY, LEGACY_TOKEN_KEY] {
            if let Err(e) = self.storage.set(key, token) {
                warn!(target: "openphotobox::session", "failed to persist '{}': {}", key, e);
            }
        }
    }

    fn persist_user(&self, user: &SessionUser) {
        let res = serde_json::to_string(user)
            .map_err(ClientError::from)
            .and_then(|json| self.storage.set(USER_KEY, &json));
        if let Err(e) = res {
            warn!(target: "openphotobox::session", "failed to persist user record: {}", e);
        }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<LoginResponse> {
        self.set_loading(true);
        let result = self.login_inner(credentials).await;
        if let Err(e) = &result {
            warn!(target: "openphotobox::session", "login failed for '{}': {}", credentials.username, e);
            self.clear_auth();
        }
        self.set_loading(false);
        result
    }

    async fn login_inner(&self, credentials: &LoginRequest) -> ClientResult<LoginResponse> {
        let resp = self.auth.login(credentials).await;
        if let Some(err) = resp.error_or("Login failed") {
            return Err(err);
        }
        let data = resp.data.ok_or_else(|| ClientError::decode("Login failed: empty response"))?;
        self.set_auth(&data.token, data.user.clone());
        info!(target: "openphotobox::session", "logged in as '{}'", data.user.username);
        Ok(data)
    }

    /// Tells the backend (best effort), clears the session and returns the login path.
    pub async fn logout(&self) -> &'static str {
        self.set_loading(true);
        if self.token().is_some() {
            let resp = self.auth.logout().await;
            if !resp.success {
                warn!(target: "openphotobox::session", "logout error: {}", resp.error.unwrap_or_default());
            }
        }
        self.clear_auth();
        self.set_loading(false);
        info!(target: "openphotobox::session", "logged out");
        LOGIN_PATH
    }

    /// Refreshes the cached user. `Ok(None)` without a token; any failure clears the
    /// session and is returned.
    pub async fn get_profile(&self) -> ClientResult<Option<SessionUser>> {
        if self.token().is_none() {
            return Ok(None);
        }
        self.set_loading(true);
        let resp = self.auth.me().await;
        let result = match (resp.error_or("Failed to get profile"), resp.data) {
            (Some(err), _) => Err(err),
            (None, Some(profile)) => {
                self.persist_user(&profile.user);
                let user = profile.user;
                self.update(|s| s.user = Some(user.clone()));
                Ok(Some(user))
            }
            (None, None) => Err(ClientError::decode("Failed to get profile: empty response")),
        };
        if let Err(e) = &result {
            warn!(target: "openphotobox::session", "profile refresh failed: {}", e);
            self.clear_auth();
        }
        self.set_loading(false);
        result
    }

    /// Re-hydrates the session from storage without a network call. Returns whether a
    /// full session was restored; a corrupt user record clears storage.
    ///
    /// A token stored without a user record is loaded on its own, leaving the user to be
    /// fetched by [`get_profile`](Self::get_profile).
    pub fn initialize_auth(&self) -> bool {
        let token = self.storage.get(TOKEN_KEY).or_else(|| self.storage.get(LEGACY_TOKEN_KEY)).filter(|t| !t.is_empty());
        let Some(token) = token else {
            debug!(target: "openphotobox::session", "no persisted session");
            return false;
        };
        let Some(raw_user) = self.storage.get(USER_KEY) else {
            debug!(target: "openphotobox::session", "token restored without a user record");
            self.update(|s| {
                s.token = Some(token);
                s.user = None;
            });
            return false;
        };
        match serde_json::from_str::<SessionUser>(&raw_user) {
            Ok(user) => {
                tprintln!("session.restore user={}", user.username);
                self.set_auth(&token, user);
                true
            }
            Err(e) => {
                warn!(target: "openphotobox::session", "failed to parse stored user data: {}", e);
                self.clear_auth();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, AuthApi};
    use crate::config::ClientConfig;
    use crate::session::storage::{KeyValueStore, MemoryStore};
    use std::sync::Mutex;

    fn offline_store(storage: SharedStorage) -> SessionStore {
        // port 9 (discard) on loopback: nothing listens there in test environments
        let cfg = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let client = ApiClient::new(cfg, Arc::new(|| None)).unwrap();
        SessionStore::new(AuthApi::new(client), storage)
    }

    fn user(name: &str) -> SessionUser {
        SessionUser { id: "1".into(), username: name.into(), email: format!("{}@example.org", name), is_admin: false, last_login: None }
    }

    #[test]
    fn set_auth_writes_both_token_keys() {
        let storage = MemoryStore::shared();
        let store = offline_store(storage.clone());
        store.set_auth("tok", user("ana"));
        assert!(store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok"));
        assert_eq!(storage.get(LEGACY_TOKEN_KEY).as_deref(), Some("tok"));
        let saved: SessionUser = serde_json::from_str(&storage.get(USER_KEY).unwrap()).unwrap();
        assert_eq!(saved.username, "ana");

        store.clear_auth();
        assert!(!store.is_authenticated());
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn initialize_restores_from_legacy_key() {
        let storage = MemoryStore::shared();
        storage.set(LEGACY_TOKEN_KEY, "old").unwrap();
        storage.set(USER_KEY, r#"{"id": 3, "username": "bo", "email": "", "is_admin": true}"#).unwrap();
        let store = offline_store(storage.clone());
        assert!(store.initialize_auth());
        assert!(store.is_admin());
        assert_eq!(store.token().as_deref(), Some("old"));
        // canonical key is written on restore
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("old"));
    }

    #[test]
    fn initialize_clears_corrupt_user() {
        let storage = MemoryStore::shared();
        storage.set(TOKEN_KEY, "t").unwrap();
        storage.set(USER_KEY, "{broken").unwrap();
        let store = offline_store(storage.clone());
        assert!(!store.initialize_auth());
        assert!(storage.keys().is_empty());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn initialize_with_token_only_leaves_user_unset() {
        let storage = MemoryStore::shared();
        storage.set(TOKEN_KEY, "t").unwrap();
        let store = offline_store(storage.clone());
        assert!(!store.initialize_auth());
        assert_eq!(store.token().as_deref(), Some("t"));
        assert!(store.user().is_none());
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn unreachable_backend_fails_as_transport() {
        let storage = MemoryStore::shared();
        let store = offline_store(storage.clone());
        let err = store.login(&LoginRequest::new("ana", "secret")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }), "{err:?}");
        assert!(!store.is_loading());

        store.set_auth("t", user("ana"));
        let err = store.get_profile().await.unwrap_err();
        assert_eq!(err.code_str(), "transport");
        assert!(!store.is_authenticated());
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn observers_see_every_change_until_removed() {
        let store = offline_store(MemoryStore::shared());
        let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = store.on_change(move |s| sink.lock().unwrap().push(s.is_authenticated()));
        store.set_auth("t", user("ana"));
        store.clear_auth();
        assert!(store.remove_observer(id));
        assert!(!store.remove_observer(id));
        store.set_auth("t", user("ana"));
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn get_profile_without_token_is_a_no_op() {
        let store = offline_store(MemoryStore::shared());
        assert_eq!(store.get_profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_when_logged_out_is_harmless() {
        let storage = MemoryStore::shared();
        let store = offline_store(storage.clone());
        assert_eq!(store.logout().await, LOGIN_PATH);
        assert_eq!(store.logout().await, LOGIN_PATH);
        assert!(storage.keys().is_empty());
        assert!(!store.is_loading());
    }
}
