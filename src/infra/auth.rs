//! [`AuthService`] over the content API's session endpoints.
//!
//! Shares the [`ApiClient`] so the session cookie set by login is sent with
//! every later request. The cookie doubles as the session token handed to
//! storage, so a later process can resume the session. Auth calls are never
//! cached.

use std::sync::Arc;

use async_trait::async_trait;
use newsdesk_api_types::{AuthStatus, LoginRequest, LoginResponse, User};
use reqwest::Method;
use serde_json::Value;

use crate::application::auth::{AuthError, AuthService, LoginOutcome};

use super::api::{ApiClient, ApiError};

const STATUS_PATH: &str = "api/auth/status/";
const USER_PATH: &str = "api/auth/user/";
const LOGIN_PATH: &str = "api/auth/login/";
const LOGOUT_PATH: &str = "api/auth/logout/";

const DEFAULT_LOGIN_FAILURE: &str = "Invalid username or password";

#[derive(Clone, Debug)]
pub struct HttpAuthService {
    api: Arc<ApiClient>,
}

impl HttpAuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn check_auth_status(&self) -> Result<bool, AuthError> {
        match self
            .api
            .send::<AuthStatus, ()>(Method::GET, STATUS_PATH, None)
            .await
        {
            Ok(status) => Ok(status.authenticated),
            Err(err) if is_unauthenticated(&err) => Ok(false),
            Err(err) => Err(map_api_error(err)),
        }
    }

    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        match self
            .api
            .send::<User, ()>(Method::GET, USER_PATH, None)
            .await
        {
            Ok(user) => Ok(Some(user)),
            Err(err) if is_unauthenticated(&err) || err.is_not_found() => Ok(None),
            Err(err) => Err(map_api_error(err)),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let outcome = match self
            .api
            .send::<LoginResponse, _>(Method::POST, LOGIN_PATH, Some(&request))
            .await
        {
            Ok(LoginResponse {
                success: true,
                user: Some(user),
                ..
            }) => LoginOutcome::Success(user),
            Ok(LoginResponse {
                success: true,
                user: None,
                ..
            }) => match self.current_user().await? {
                Some(user) => LoginOutcome::Success(user),
                None => LoginOutcome::Failure("Signed in but no user was returned".to_string()),
            },
            Ok(LoginResponse { error, .. }) => {
                LoginOutcome::Failure(error.unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string()))
            }
            Err(ApiError::Status { status, body }) if matches!(status, 400 | 401 | 403) => {
                LoginOutcome::Failure(failure_message(&body))
            }
            Err(err) => return Err(map_api_error(err)),
        };

        if matches!(outcome, LoginOutcome::Success(_)) {
            self.api.cache().invalidate_all();
        }
        Ok(outcome)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.api.cache().invalidate_all();
        match self
            .api
            .send::<Value, _>(Method::POST, LOGOUT_PATH, Some(&Value::Object(Default::default())))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unauthenticated(&err) => Ok(()),
            Err(err) => Err(map_api_error(err)),
        }
    }

    fn session_token(&self) -> Option<String> {
        self.api.session_cookies()
    }

    fn restore_session_token(&self, token: &str) {
        self.api.restore_session_cookies(token);
    }
}

fn is_unauthenticated(err: &ApiError) -> bool {
    matches!(err.status(), Some(401 | 403))
}

fn map_api_error(err: ApiError) -> AuthError {
    match err {
        ApiError::Status { status, .. } => AuthError::Rejected { status },
        other => AuthError::from_service(other),
    }
}

/// Pull a human-readable reason out of an error body, if the API sent one.
fn failure_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_prefers_api_reason() {
        assert_eq!(failure_message(r#"{"error":"Account locked"}"#), "Account locked");
        assert_eq!(failure_message(r#"{"detail":"Bad credentials"}"#), "Bad credentials");
        assert_eq!(failure_message("<html>"), DEFAULT_LOGIN_FAILURE);
    }

    #[test]
    fn status_errors_map_to_rejected() {
        let err = map_api_error(ApiError::Status {
            status: 500,
            body: String::new(),
        });
        assert!(matches!(err, AuthError::Rejected { status: 500 }));
    }
}
