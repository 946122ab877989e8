//! Types for authentication

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::model::User;

/// Email/password pair used to log in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// Latest authentication state published to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// Whether the provider is still restoring a previous session
    pub is_loading: bool,

    /// The active session, if any
    pub session: Option<Session>,
}

impl AuthState {
    /// Initial state, before any session restore finished
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            session: None,
        }
    }

    /// Settled state for the given session
    pub fn settled(session: Option<Session>) -> Self {
        Self {
            is_loading: false,
            session,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }
}

/// User object as returned by the GoTrue endpoints
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<AuthUser> for User {
    fn from(user: AuthUser) -> Self {
        let display_name = ["display_name", "full_name", "name"]
            .iter()
            .find_map(|key| user.user_metadata.get(*key).and_then(|v| v.as_str()))
            .map(|s| s.to_string());

        User {
            id: user.id,
            email: user.email.unwrap_or_default(),
            display_name,
            created_at: user.created_at,
        }
    }
}

/// Body of a successful `/token` call
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl From<TokenResponse> for Session {
    fn from(response: TokenResponse) -> Self {
        let mut session = Session::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            response.user.into(),
        );
        session.token_type = response.token_type;
        if response.expires_at.is_some() {
            session.expires_at = response.expires_at;
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_from_metadata() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "ana@example.com",
            "user_metadata": { "full_name": "Ana Lopez" },
            "created_at": "2024-01-02T03:04:05Z"
        }))
        .unwrap();
        let user: User = user.into();
        assert_eq!(user.display_name.as_deref(), Some("Ana Lopez"));
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn missing_metadata_is_tolerated() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1",
            "email": null,
            "created_at": "2024-01-02T03:04:05Z"
        }))
        .unwrap();
        let user: User = user.into();
        assert_eq!(user.display_name, None);
        assert_eq!(user.email, "");
    }
}
