//! Types for storage operations

use serde::Deserialize;

/// Options for uploading a file
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Overwrite an existing object under the same key
    pub upsert: bool,

    /// Cache control header; defaults to one hour
    pub cache_control: Option<String>,

    /// MIME type of the uploaded bytes
    pub content_type: Option<String>,
}

impl UploadOptions {
    pub fn upsert() -> Self {
        Self {
            upsert: true,
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }
}

/// A stored object and the URL it is publicly served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub public_url: String,
}

/// Body of a successful upload
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(rename = "Key")]
    pub key: Option<String>,
}
