//! In-process object storage for tests and demos

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::storage::{ObjectStorage, UploadOptions, UploadedObject};

/// Keeps uploaded objects in a map keyed by object key
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    failing: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following upload fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        _session: &Session,
        key: &str,
        data: Vec<u8>,
        options: UploadOptions,
    ) -> Result<UploadedObject> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::storage("Storage unavailable"));
        }

        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        if objects.contains_key(key) && !options.upsert {
            return Err(Error::storage("The resource already exists"));
        }
        objects.insert(key.to_string(), data);

        Ok(UploadedObject {
            key: key.to_string(),
            public_url: self.public_url(key),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://objects/{}", key)
    }
}
