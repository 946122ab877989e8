//! In-process auth provider for tests and demos

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::auth::{AuthProvider, AuthSubscription, Credentials, Session, SessionCell};
use crate::error::{Error, Result};
use crate::model::User;

/// Auth provider backed by a fixed set of accounts
pub struct MemoryAuth {
    accounts: RwLock<HashMap<String, (String, User)>>,
    cell: SessionCell,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    /// Starts in the loading state, like a provider restoring a session
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            cell: SessionCell::new(),
        }
    }

    /// Register an account and return its user
    pub fn add_account(&self, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: None,
            created_at: Utc::now(),
        };
        self.accounts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(email.to_string(), (password.to_string(), user.clone()));
        user
    }

    /// Leave the loading state without a session
    pub fn finish_loading(&self) {
        self.cell.publish(None);
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    fn subscribe(&self) -> AuthSubscription {
        self.cell.subscribe()
    }

    fn session(&self) -> Option<Session> {
        self.cell.session()
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let user = {
            let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
            match accounts.get(&credentials.email) {
                Some((password, user)) if *password == credentials.password => user.clone(),
                _ => return Err(Error::auth("Invalid login credentials")),
            }
        };

        let session = Session::new(
            format!("memory-{}", Uuid::new_v4()),
            format!("memory-refresh-{}", Uuid::new_v4()),
            3600,
            user,
        );
        self.cell.publish(Some(session.clone()));
        Ok(session)
    }

    async fn logout(&self) -> Result<()> {
        if self.cell.session().is_none() {
            return Err(Error::auth("Not logged in"));
        }
        self.cell.publish(None);
        Ok(())
    }

    async fn current_user(&self, session: &Session) -> Result<User> {
        match self.cell.session() {
            Some(current) if current.access_token == session.access_token => Ok(current.user),
            _ => Err(Error::auth("Session is not active")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_and_logout_publish_state() {
        let auth = MemoryAuth::new();
        let user = auth.add_account("chef@example.com", "secret");
        let mut subscription = auth.subscribe();
        assert!(subscription.current().is_loading);

        auth.finish_loading();
        let state = subscription.changed().await.unwrap();
        assert!(!state.is_loading);
        assert!(state.session.is_none());

        let session = auth
            .login(&Credentials::new("chef@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(session.user, user);
        assert_eq!(subscription.changed().await.unwrap().user(), Some(&user));

        auth.logout().await.unwrap();
        assert!(subscription.changed().await.unwrap().session.is_none());
        assert!(auth.logout().await.is_err());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = MemoryAuth::new();
        auth.add_account("chef@example.com", "secret");
        let result = auth.login(&Credentials::new("chef@example.com", "nope")).await;
        assert!(matches!(result, Err(Error::Auth(_))));
        assert!(auth.session().is_none());
    }
}
