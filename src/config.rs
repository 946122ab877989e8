//! Configuration for the restaurant client

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Connection settings for the Supabase project backing the application
#[derive(Debug, Clone)]
pub struct RestoConfig {
    /// The base URL of the project
    pub url: Url,

    /// The anonymous API key
    pub anon_key: String,

    /// Client options
    pub options: ClientOptions,
}

impl RestoConfig {
    /// Creates a new configuration, validating the URL and key.
    pub fn new(url_str: &str, anon_key: String) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key,
            options: ClientOptions::default(),
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let url_str = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;
        Self::new(&url_str, anon_key)
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// The project URL without its trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

/// Configuration options for the restaurant client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Collection holding restaurant records
    pub restaurants_table: String,

    /// Collection holding vote records
    pub votes_table: String,

    /// Storage bucket receiving restaurant photos
    pub image_bucket: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Value sent in the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            restaurants_table: "restaurants".to_string(),
            votes_table: "restaurant_votes".to_string(),
            image_bucket: "restaurant-images".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            client_info: concat!("resto-collegues/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the restaurants collection name
    pub fn with_restaurants_table(mut self, value: &str) -> Self {
        self.restaurants_table = value.to_string();
        self
    }

    /// Set the votes collection name
    pub fn with_votes_table(mut self, value: &str) -> Self {
        self.votes_table = value.to_string();
        self
    }

    /// Set the storage bucket for photos
    pub fn with_image_bucket(mut self, value: &str) -> Self {
        self.image_bucket = value.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the client info header
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_valid() {
        let config = RestoConfig::new("http://localhost:54321", "anon".to_string()).unwrap();
        assert_eq!(config.url.to_string(), "http://localhost:54321/");
        assert_eq!(config.base_url(), "http://localhost:54321");
        assert_eq!(config.options.votes_table, "restaurant_votes");
    }

    #[test]
    fn config_new_invalid_url() {
        match RestoConfig::new("not a valid url", "anon".to_string()) {
            Err(Error::Url(_)) => {}
            other => panic!("Expected Url error, got {:?}", other),
        }
    }

    #[test]
    fn config_new_empty_key() {
        match RestoConfig::new("http://localhost:54321", String::new()) {
            Err(Error::Config(msg)) => assert!(msg.contains("anon_key cannot be empty")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn options_builder() {
        let options = ClientOptions::default()
            .with_restaurants_table("places")
            .with_image_bucket("photos")
            .with_request_timeout(None);
        assert_eq!(options.restaurants_table, "places");
        assert_eq!(options.image_bucket, "photos");
        assert!(options.request_timeout.is_none());
    }
}
