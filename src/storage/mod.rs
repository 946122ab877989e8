//! Object storage for restaurant photos

mod memory;
mod types;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::auth::Session;
use crate::error::{Error, Result};

pub use memory::MemoryStorage;
pub use types::*;

/// The binary-object storage collaborator
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key` and return its public URL
    async fn upload(
        &self,
        session: &Session,
        key: &str,
        data: Vec<u8>,
        options: UploadOptions,
    ) -> Result<UploadedObject>;

    /// Public URL an object is (or would be) served from
    fn public_url(&self, key: &str) -> String;
}

/// Storage client for one bucket of a Supabase project
pub struct SupabaseStorage {
    /// The base URL for the project
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    bucket_id: String,

    client_info: String,

    timeout: Option<Duration>,
}

impl SupabaseStorage {
    pub fn new(
        url: &str,
        key: &str,
        client: Client,
        bucket_id: &str,
        client_info: &str,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            bucket_id: bucket_id.to_string(),
            client_info: client_info.to_string(),
            timeout,
        }
    }

    /// URL of an object under `/storage/v1/object/`, each key segment percent-encoded
    fn object_url(&self, scope: &[&str], key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("Not a base URL: {}", self.url)))?
            .pop_if_empty()
            .extend(["storage", "v1", "object"])
            .extend(scope)
            .extend(key.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(
        &self,
        session: &Session,
        key: &str,
        data: Vec<u8>,
        options: UploadOptions,
    ) -> Result<UploadedObject> {
        let url = self.object_url(&[self.bucket_id.as_str()], key)?;

        let file_name = Path::new(key)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let mut part = multipart::Part::bytes(data).file_name(file_name);
        if let Some(content_type) = &options.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new().part("file", part);

        let mut request = self
            .client
            .post(url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .header("X-Client-Info", &self.client_info)
            .header(
                "Cache-Control",
                options.cache_control.unwrap_or_else(|| "3600".to_string()),
            )
            .header("x-upsert", options.upsert.to_string())
            .multipart(form);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(Error::storage(format!(
                "Upload failed with status {}: {}",
                status, text
            )));
        }

        let body = response.json::<UploadResponse>().await?;
        log::debug!("uploaded {:?} to bucket {}", body.key, self.bucket_id);

        Ok(UploadedObject {
            key: key.to_string(),
            public_url: self.public_url(key),
        })
    }

    fn public_url(&self, key: &str) -> String {
        match self.object_url(&["public", self.bucket_id.as_str()], key) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}/storage/v1/object/public/{}/{}",
                self.url, self.bucket_id, key
            ),
        }
    }
}
