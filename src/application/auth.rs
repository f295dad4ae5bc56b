//! Process-wide authentication state.
//!
//! The store keeps a read-through copy of the session in [`SessionStorage`]
//! so a restart can show the last known user immediately and resend the
//! session token, then reconciles with the live [`AuthService`] check. The
//! live answer always wins.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use newsdesk_api_types::User;
use thiserror::Error;
use tracing::{info, warn};

use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "application::auth::AuthSessionStore";

pub const AUTH_FLAG_KEY: &str = "newsdesk.is_authenticated";
pub const AUTH_USER_KEY: &str = "newsdesk.user";
pub const AUTH_TOKEN_KEY: &str = "newsdesk.session_token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth service error: {0}")]
    Service(String),
    #[error("auth service rejected the request with status {status}")]
    Rejected { status: u16 },
}

impl AuthError {
    pub fn from_service(err: impl std::fmt::Display) -> Self {
        Self::Service(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage holds invalid data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("session storage error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(User),
    Failure(String),
}

/// Remote session checks.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn check_auth_status(&self) -> Result<bool, AuthError>;

    async fn current_user(&self) -> Result<Option<User>, AuthError>;

    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;

    /// Opaque credential that lets a later process resume the remote session.
    fn session_token(&self) -> Option<String> {
        None
    }

    fn restore_session_token(&self, _token: &str) {}
}

/// String key/value persistence that outlives the process.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub user: Option<User>,
    /// Set once the live check has run.
    pub initialized: bool,
}

pub struct AuthSessionStore {
    service: Arc<dyn AuthService>,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<SessionState>,
}

impl AuthSessionStore {
    pub fn new(service: Arc<dyn AuthService>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            service,
            storage,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        rw_read(&self.state, SOURCE, "snapshot").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_authenticated").authenticated
    }

    pub fn current_user(&self) -> Option<User> {
        rw_read(&self.state, SOURCE, "current_user").user.clone()
    }

    pub fn is_initialized(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_initialized").initialized
    }

    /// Hydrate from storage, then reconcile with the live check. Runs the
    /// check only once; later calls return the current state.
    pub async fn initialize(&self) -> SessionState {
        if self.is_initialized() {
            return self.snapshot();
        }
        self.hydrate();
        self.refresh().await
    }

    /// Re-run the live check and update state and storage to match it.
    pub async fn refresh(&self) -> SessionState {
        match self.service.check_auth_status().await {
            Ok(true) => {
                let user = match self.service.current_user().await {
                    Ok(Some(user)) => Some(user),
                    Ok(None) => self.current_user(),
                    Err(err) => {
                        warn!(error = %err, "Failed to load current user; keeping stored user");
                        self.current_user()
                    }
                };
                self.persist(user.as_ref());
                self.replace(SessionState {
                    authenticated: true,
                    user,
                    initialized: true,
                });
            }
            Ok(false) => {
                self.clear_storage();
                self.replace(SessionState {
                    initialized: true,
                    ..SessionState::default()
                });
            }
            Err(err) => {
                warn!(error = %err, "Auth status check failed; treating session as signed out");
                self.clear_storage();
                self.replace(SessionState {
                    initialized: true,
                    ..SessionState::default()
                });
            }
        }
        self.snapshot()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let outcome = self.service.login(username, password).await?;
        match &outcome {
            LoginOutcome::Success(user) => {
                self.persist(Some(user));
                self.replace(SessionState {
                    authenticated: true,
                    user: Some(user.clone()),
                    initialized: true,
                });
                info!(username = %user.username, "Signed in");
            }
            LoginOutcome::Failure(reason) => {
                info!(username, reason = %reason, "Sign-in rejected");
            }
        }
        Ok(outcome)
    }

    /// Local state is cleared even when the remote call fails.
    pub async fn logout(&self) {
        if !self.is_initialized() {
            self.restore_token();
        }
        if let Err(err) = self.service.logout().await {
            warn!(error = %err, "Remote logout failed; clearing local session anyway");
        }
        self.clear_storage();
        self.replace(SessionState {
            initialized: true,
            ..SessionState::default()
        });
    }

    fn hydrate(&self) {
        self.restore_token();
        let flag = match self.storage.get(AUTH_FLAG_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                warn!(error = %err, key = AUTH_FLAG_KEY, "Failed to read session storage");
                false
            }
        };
        let user = match self.storage.get(AUTH_USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, key = AUTH_USER_KEY, "Discarding unreadable stored user");
                    if let Err(err) = self.storage.remove(AUTH_USER_KEY) {
                        warn!(error = %err, key = AUTH_USER_KEY, "Failed to clear session storage");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, key = AUTH_USER_KEY, "Failed to read session storage");
                None
            }
        };

        let mut state = rw_write(&self.state, SOURCE, "hydrate");
        state.authenticated = flag;
        state.user = if flag { user } else { None };
    }

    fn restore_token(&self) {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(Some(token)) => self.service.restore_session_token(&token),
            Ok(None) => {}
            Err(err) => warn!(error = %err, key = AUTH_TOKEN_KEY, "Failed to read session storage"),
        }
    }

    fn replace(&self, next: SessionState) {
        *rw_write(&self.state, SOURCE, "replace") = next;
    }

    /// Storage failures are logged only; the in-memory state stays authoritative.
    fn persist(&self, user: Option<&User>) {
        if let Err(err) = self.storage.set(AUTH_FLAG_KEY, "true") {
            warn!(error = %err, key = AUTH_FLAG_KEY, "Failed to persist session flag");
        }
        if let Some(token) = self.service.session_token()
            && let Err(err) = self.storage.set(AUTH_TOKEN_KEY, &token)
        {
            warn!(error = %err, key = AUTH_TOKEN_KEY, "Failed to persist session token");
        }
        let Some(user) = user else {
            return;
        };
        let result = serde_json::to_string(user)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.set(AUTH_USER_KEY, &raw));
        if let Err(err) = result {
            warn!(error = %err, key = AUTH_USER_KEY, "Failed to persist session user");
        }
    }

    fn clear_storage(&self) {
        for key in [AUTH_FLAG_KEY, AUTH_USER_KEY, AUTH_TOKEN_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(error = %err, key, "Failed to clear session storage");
            }
        }
    }
}

impl std::fmt::Debug for AuthSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionStore")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}
