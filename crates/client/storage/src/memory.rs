//! In-memory content store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::error::{Result, StoreError};
use crate::store::{ContentFetcher, ContentStore};

#[derive(Default)]
struct Blobs {
    by_url: HashMap<String, Bytes>,
    uploads: Vec<(String, Bytes)>,
    failing_urls: HashSet<String>,
    reject_uploads: bool,
}

/// Content store that keeps blobs in process memory.
///
/// Records every upload and supports failure injection, which makes it the
/// store of choice for local runs and tests.
#[derive(Clone)]
pub struct MemoryContentStore {
    upload_host: Url,
    blobs: Arc<Mutex<Blobs>>,
}

impl MemoryContentStore {
    pub fn new(upload_host: Url) -> Self {
        Self {
            upload_host,
            blobs: Arc::new(Mutex::new(Blobs::default())),
        }
    }

    fn with_blobs<T>(&self, f: impl FnOnce(&mut Blobs) -> T) -> Result<T> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(f(&mut blobs))
    }

    /// Every upload in the order it happened, as `(path, bytes)`.
    pub fn uploads(&self) -> Vec<(String, Bytes)> {
        self.with_blobs(|b| b.uploads.clone()).unwrap_or_default()
    }

    /// Make subsequent fetches of `url` fail.
    pub fn fail_fetches_of(&self, url: impl Into<String>) {
        let url = url.into();
        let _ = self.with_blobs(|b| b.failing_urls.insert(url));
    }

    /// Reject (or accept again) every upload.
    pub fn reject_uploads(&self, reject: bool) {
        let _ = self.with_blobs(|b| b.reject_uploads = reject);
    }

    /// Place content at an arbitrary URL without recording an upload.
    pub fn insert(&self, url: impl Into<String>, content: impl Into<Bytes>) {
        let (url, content) = (url.into(), content.into());
        let _ = self.with_blobs(|b| b.by_url.insert(url, content));
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn upload_host(&self) -> &Url {
        &self.upload_host
    }

    async fn put(&self, path: &str, content: Bytes) -> Result<Url> {
        let url = self.url_for(path)?;

        self.with_blobs(|b| {
            if b.reject_uploads {
                return Err(StoreError::UploadRejected {
                    path: path.to_string(),
                    status: 500,
                    reason: "uploads rejected".to_string(),
                });
            }
            b.uploads.push((path.to_string(), content.clone()));
            b.by_url.insert(url.to_string(), content);
            Ok(())
        })??;

        Ok(url)
    }
}

#[async_trait]
impl ContentFetcher for MemoryContentStore {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.with_blobs(|b| {
            if b.failing_urls.contains(url) {
                return Err(StoreError::FetchFailed {
                    url: url.to_string(),
                    status: 503,
                });
            }
            b.by_url
                .get(url)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(url.to_string()))
        })?
    }
}
