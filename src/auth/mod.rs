//! Authentication against the backend's auth service

mod memory;
mod session;
mod types;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::model::User;

pub use memory::MemoryAuth;
pub use session::*;
pub use types::*;

/// The authentication collaborator
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Subscribe to authentication state changes
    fn subscribe(&self) -> AuthSubscription;

    /// The session currently held, if any
    fn session(&self) -> Option<Session>;

    /// Log in and publish the new session
    async fn login(&self, credentials: &Credentials) -> Result<Session>;

    /// Log out and publish the signed-out state
    async fn logout(&self) -> Result<()>;

    /// Fetch the user behind a session
    async fn current_user(&self, session: &Session) -> Result<User>;
}

/// Auth client for a Supabase project (GoTrue endpoints)
pub struct SupabaseAuth {
    /// The base URL for the project
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    client_info: String,

    timeout: Option<Duration>,

    cell: SessionCell,
}

impl SupabaseAuth {
    /// Create a new auth client; its state stays `loading` until [`SupabaseAuth::initialize`]
    pub fn new(
        url: &str,
        key: &str,
        client: Client,
        client_info: &str,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            client_info: client_info.to_string(),
            timeout,
            cell: SessionCell::new(),
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Restore a previously stored session, then leave the loading state.
    ///
    /// The stored session is kept only if it is unexpired and the backend still
    /// resolves its user.
    pub async fn initialize(&self, stored: Option<Session>) {
        let restored = match stored {
            Some(session) if !session.is_expired() => match self.current_user(&session).await {
                Ok(user) => Some(Session { user, ..session }),
                Err(e) => {
                    log::warn!("discarding stored session: {}", e);
                    None
                }
            },
            Some(_) => {
                log::info!("stored session expired");
                None
            }
            None => None,
        };
        self.cell.publish(restored);
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    fn subscribe(&self) -> AuthSubscription {
        self.cell.subscribe()
    }

    fn session(&self) -> Option<Session> {
        self.cell.session()
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let url = self.get_auth_url("/token");

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .query("grant_type", "password")
            .timeout(self.timeout)
            .service_error(Error::auth::<String>)
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password,
            }))?
            .execute::<TokenResponse>()
            .await?;

        let session: Session = response.into();
        log::info!("signed in as {}", session.user.id);
        self.cell.publish(Some(session.clone()));
        Ok(session)
    }

    async fn logout(&self) -> Result<()> {
        let url = self.get_auth_url("/logout");

        let token = match self.cell.session() {
            Some(session) => session.access_token,
            None => return Err(Error::auth("Not logged in")),
        };

        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .bearer_auth(&token)
            .timeout(self.timeout)
            .service_error(Error::auth::<String>)
            .execute_empty()
            .await?;

        self.cell.publish(None);
        Ok(())
    }

    async fn current_user(&self, session: &Session) -> Result<User> {
        let url = self.get_auth_url("/user");

        let user = Fetch::get(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .bearer_auth(&session.access_token)
            .timeout(self.timeout)
            .service_error(Error::auth::<String>)
            .execute::<AuthUser>()
            .await?;

        Ok(user.into())
    }
}
