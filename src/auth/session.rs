//! Session management for authentication

use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

use crate::auth::AuthState;
use crate::error::Result;
use crate::model::User;

/// An authenticated session; passed explicitly to every component that talks to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The token type
    pub token_type: String,

    /// The expiry time in seconds
    pub expires_in: i64,

    /// The expiry timestamp
    pub expires_at: Option<i64>,

    /// The authenticated user
    pub user: User,
}

/// Claims read from the access token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: Option<i64>,
    pub email: Option<String>,
    pub role: Option<String>,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

impl Session {
    /// Create a new session
    pub fn new(access_token: String, refresh_token: String, expires_in: i64, user: User) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at: Some(unix_now() + expires_in),
            user,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => unix_now() >= expires_at,
            None => false,
        }
    }

    /// Decode the access token payload. The signature is not checked.
    pub fn claims(&self) -> Result<TokenClaims> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<TokenClaims>(
            &self.access_token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )?;
        Ok(data.claims)
    }
}

/// Shared holder of the latest [`AuthState`]
pub(crate) struct SessionCell {
    state: watch::Sender<AuthState>,
}

impl SessionCell {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::loading());
        Self { state }
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn publish(&self, session: Option<Session>) {
        log::debug!(
            "auth state settled (signed in: {})",
            session.is_some()
        );
        self.state.send_replace(AuthState::settled(session));
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.state.subscribe(),
        }
    }
}

/// Live view of the authentication state. Dropping it unsubscribes.
pub struct AuthSubscription {
    receiver: watch::Receiver<AuthState>,
}

impl AuthSubscription {
    /// The latest published state
    pub fn current(&self) -> AuthState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state change; `None` once the provider is gone
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: "user@example.com".to_string(),
            display_name: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn claims_are_read_without_the_secret() {
        let token = jsonwebtoken::encode(
            &Header::default(),
            &json!({
                "sub": "user-1",
                "exp": 4102444800i64,
                "aud": "authenticated",
                "role": "authenticated"
            }),
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap();

        let session = Session::new(token, "refresh".to_string(), 3600, user());
        let claims = session.claims().unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp, Some(4102444800));
        assert_eq!(claims.role.as_deref(), Some("authenticated"));
    }

    #[test]
    fn garbage_token_is_an_error() {
        let session = Session::new("not-a-jwt".to_string(), String::new(), 3600, user());
        assert!(session.claims().is_err());
    }

    #[test]
    fn expiry() {
        let mut session = Session::new("t".to_string(), "r".to_string(), 3600, user());
        assert!(!session.is_expired());
        session.expires_at = Some(unix_now() - 1);
        assert!(session.is_expired());
        session.expires_at = None;
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn subscribers_see_the_latest_state() {
        let cell = SessionCell::new();
        let mut subscription = cell.subscribe();
        assert!(subscription.current().is_loading);

        let session = Session::new("t".to_string(), "r".to_string(), 3600, user());
        cell.publish(Some(session.clone()));

        let state = subscription.changed().await.unwrap();
        assert!(!state.is_loading);
        assert_eq!(state.session, Some(session));
    }
}
