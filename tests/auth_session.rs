use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use httpmock::MockServer;
use newsdesk::application::auth::{
    AUTH_FLAG_KEY, AUTH_TOKEN_KEY, AUTH_USER_KEY, AuthError, AuthService, AuthSessionStore, LoginOutcome,
    SessionStorage, StorageError,
};
use newsdesk::cache::RequestCache;
use newsdesk::infra::api::ApiClient;
use newsdesk::infra::auth::HttpAuthService;
use newsdesk::infra::storage::{FileStorage, MemoryStorage};
use newsdesk_api_types::User;

fn editor() -> User {
    User {
        id: 1,
        username: "editor".to_string(),
        email: Some("editor@news.example".to_string()),
        is_staff: true,
    }
}

/// Scripted auth backend.
#[derive(Default)]
struct FakeAuth {
    authenticated: Mutex<Option<bool>>,
    user: Mutex<Option<User>>,
    logout_fails: bool,
    status_calls: AtomicUsize,
}

impl FakeAuth {
    fn signed_in(user: User) -> Self {
        Self {
            authenticated: Mutex::new(Some(true)),
            user: Mutex::new(Some(user)),
            ..Self::default()
        }
    }

    fn signed_out() -> Self {
        Self {
            authenticated: Mutex::new(Some(false)),
            ..Self::default()
        }
    }

    /// Status checks fail with a transport error.
    fn unreachable() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn check_auth_status(&self) -> Result<bool, AuthError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        (*self.authenticated.lock().unwrap())
            .ok_or_else(|| AuthError::Service("connection refused".to_string()))
    }

    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.user.lock().unwrap().clone())
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        if username == "editor" && password == "correct" {
            *self.authenticated.lock().unwrap() = Some(true);
            *self.user.lock().unwrap() = Some(editor());
            Ok(LoginOutcome::Success(editor()))
        } else {
            Ok(LoginOutcome::Failure("Invalid credentials".to_string()))
        }
    }

    async fn logout(&self) -> Result<(), AuthError> {
        if self.logout_fails {
            return Err(AuthError::Rejected { status: 500 });
        }
        *self.authenticated.lock().unwrap() = Some(false);
        *self.user.lock().unwrap() = None;
        Ok(())
    }
}

/// Storage whose every operation fails.
struct BrokenStorage;

impl SessionStorage for BrokenStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Backend("quota exceeded".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("quota exceeded".to_string()))
    }
}

fn store(service: FakeAuth, storage: Arc<dyn SessionStorage>) -> AuthSessionStore {
    AuthSessionStore::new(Arc::new(service), storage)
}

#[tokio::test]
async fn initialize_confirms_live_session_and_persists_it() {
    let storage = Arc::new(MemoryStorage::new());
    let store = store(FakeAuth::signed_in(editor()), storage.clone());
    assert!(!store.is_initialized());

    let state = store.initialize().await;

    assert!(state.initialized);
    assert!(state.authenticated);
    assert_eq!(state.user, Some(editor()));
    assert_eq!(storage.get(AUTH_FLAG_KEY).unwrap().as_deref(), Some("true"));
    let stored: User = serde_json::from_str(&storage.get(AUTH_USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored, editor());
}

#[tokio::test]
async fn stale_stored_session_is_cleared_by_live_check() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(AUTH_FLAG_KEY, "true").unwrap();
    storage
        .set(AUTH_USER_KEY, &serde_json::to_string(&editor()).unwrap())
        .unwrap();

    let store = store(FakeAuth::signed_out(), storage.clone());
    let state = store.initialize().await;

    assert!(!state.authenticated);
    assert!(state.user.is_none());
    assert!(storage.get(AUTH_FLAG_KEY).unwrap().is_none());
    assert!(storage.get(AUTH_USER_KEY).unwrap().is_none());
}

#[tokio::test]
async fn failed_status_check_is_treated_as_signed_out() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(AUTH_FLAG_KEY, "true").unwrap();

    let store = store(FakeAuth::unreachable(), storage.clone());
    let state = store.initialize().await;

    assert!(state.initialized);
    assert!(!state.authenticated);
    assert!(storage.get(AUTH_FLAG_KEY).unwrap().is_none());
}

#[tokio::test]
async fn initialize_checks_the_service_once() {
    let service = Arc::new(FakeAuth::signed_in(editor()));
    let store = AuthSessionStore::new(service.clone(), Arc::new(MemoryStorage::new()));

    store.initialize().await;
    store.initialize().await;
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);

    store.refresh().await;
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn corrupt_stored_user_is_discarded() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(AUTH_FLAG_KEY, "true").unwrap();
    storage.set(AUTH_USER_KEY, "{not json").unwrap();

    let service = FakeAuth {
        authenticated: Mutex::new(Some(true)),
        ..FakeAuth::default()
    };
    let store = store(service, storage.clone());
    let state = store.initialize().await;

    assert!(state.authenticated);
    assert!(state.user.is_none());
    assert!(storage.get(AUTH_USER_KEY).unwrap().is_none());
}

#[tokio::test]
async fn login_success_updates_state_and_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let store = store(FakeAuth::signed_out(), storage.clone());
    store.initialize().await;

    let outcome = store.login("editor", "correct").await.unwrap();

    assert_eq!(outcome, LoginOutcome::Success(editor()));
    assert!(store.is_authenticated());
    assert_eq!(store.current_user(), Some(editor()));
    assert_eq!(storage.get(AUTH_FLAG_KEY).unwrap().as_deref(), Some("true"));
}

#[tokio::test]
async fn login_failure_leaves_state_unchanged() {
    let storage = Arc::new(MemoryStorage::new());
    let store = store(FakeAuth::signed_out(), storage.clone());
    let before = store.initialize().await;

    let outcome = store.login("editor", "wrong").await.unwrap();

    assert_eq!(outcome, LoginOutcome::Failure("Invalid credentials".to_string()));
    assert_eq!(store.snapshot(), before);
    assert!(storage.get(AUTH_FLAG_KEY).unwrap().is_none());
}

#[tokio::test]
async fn logout_clears_local_session_even_when_remote_fails() {
    let storage = Arc::new(MemoryStorage::new());
    let service = FakeAuth {
        logout_fails: true,
        ..FakeAuth::signed_in(editor())
    };
    let store = store(service, storage.clone());
    store.initialize().await;
    assert!(store.is_authenticated());

    store.logout().await;

    assert!(!store.is_authenticated());
    assert!(store.current_user().is_none());
    assert!(storage.get(AUTH_FLAG_KEY).unwrap().is_none());
    assert!(storage.get(AUTH_USER_KEY).unwrap().is_none());
}

#[tokio::test]
async fn storage_failures_do_not_break_the_session() {
    let store = store(FakeAuth::signed_in(editor()), Arc::new(BrokenStorage));

    let state = store.initialize().await;
    assert!(state.authenticated);

    store.logout().await;
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn file_storage_restores_last_known_user_before_live_check() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("session.json");

    let first = store(
        FakeAuth::signed_in(editor()),
        Arc::new(FileStorage::new(&path)),
    );
    first.initialize().await;

    // Live check has no user endpoint answer; the stored user is kept.
    let service = FakeAuth {
        authenticated: Mutex::new(Some(true)),
        ..FakeAuth::default()
    };
    let second = store(service, Arc::new(FileStorage::new(&path)));
    let state = second.initialize().await;

    assert!(state.authenticated);
    assert_eq!(state.user, Some(editor()));
}

#[tokio::test]
async fn http_session_round_trip() {
    let server = MockServer::start();
    let status = server.mock(|when, then| {
        when.method("GET").path("/api/auth/status/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"authenticated": false}"#);
    });
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/api/auth/login/")
            .json_body(serde_json::json!({"username": "editor", "password": "correct"}));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success": true, "user": {"id": 1, "username": "editor", "is_staff": true}}"#);
    });
    let rejected = server.mock(|when, then| {
        when.method("POST")
            .path("/api/auth/login/")
            .json_body(serde_json::json!({"username": "editor", "password": "wrong"}));
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"error": "Invalid username or password"}"#);
    });
    let logout = server.mock(|when, then| {
        when.method("POST").path("/api/auth/logout/");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success": true}"#);
    });

    let api = ApiClient::new(
        &server.base_url(),
        Duration::from_secs(5),
        Arc::new(RequestCache::new()),
    )
    .expect("client");
    let service = Arc::new(HttpAuthService::new(Arc::new(api)));
    let store = AuthSessionStore::new(service, Arc::new(MemoryStorage::new()));

    assert!(!store.initialize().await.authenticated);
    status.assert();

    let outcome = store.login("editor", "wrong").await.expect("login call");
    assert_eq!(
        outcome,
        LoginOutcome::Failure("Invalid username or password".to_string())
    );
    rejected.assert();

    let outcome = store.login("editor", "correct").await.expect("login call");
    assert!(matches!(outcome, LoginOutcome::Success(ref user) if user.username == "editor"));
    login.assert();
    assert!(store.is_authenticated());

    store.logout().await;
    logout.assert();
    assert!(!store.is_authenticated());
}

fn http_store(server: &MockServer, storage: Arc<dyn SessionStorage>) -> AuthSessionStore {
    let api = ApiClient::new(
        &server.base_url(),
        Duration::from_secs(5),
        Arc::new(RequestCache::new()),
    )
    .expect("client");
    AuthSessionStore::new(Arc::new(HttpAuthService::new(Arc::new(api))), storage)
}

#[tokio::test]
async fn session_cookie_is_resent_by_a_later_process() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST").path("/api/auth/login/");
        then.status(200)
            .header("content-type", "application/json")
            .header("set-cookie", "sessionid=abc123; Path=/; HttpOnly")
            .body(r#"{"success": true, "user": {"id": 1, "username": "editor", "is_staff": true}}"#);
    });
    let status = server.mock(|when, then| {
        when.method("GET")
            .path("/api/auth/status/")
            .header("cookie", "sessionid=abc123");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"authenticated": true}"#);
    });
    let user = server.mock(|when, then| {
        when.method("GET")
            .path("/api/auth/user/")
            .header("cookie", "sessionid=abc123");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"id": 1, "username": "editor", "is_staff": true}"#);
    });
    let logout = server.mock(|when, then| {
        when.method("POST")
            .path("/api/auth/logout/")
            .header("cookie", "sessionid=abc123");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success": true}"#);
    });

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("session.json");

    let first = http_store(&server, Arc::new(FileStorage::new(&path)));
    let outcome = first.login("editor", "correct").await.expect("login call");
    assert!(matches!(outcome, LoginOutcome::Success(_)));
    login.assert();

    let storage = Arc::new(FileStorage::new(&path));
    assert_eq!(
        storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(),
        Some("sessionid=abc123")
    );

    let second = http_store(&server, storage.clone());
    let state = second.initialize().await;
    assert!(state.authenticated);
    assert_eq!(state.user.map(|user| user.username).as_deref(), Some("editor"));
    status.assert();
    user.assert();

    let third = http_store(&server, storage.clone());
    third.logout().await;
    logout.assert();
    assert!(storage.get(AUTH_TOKEN_KEY).unwrap().is_none());
}
