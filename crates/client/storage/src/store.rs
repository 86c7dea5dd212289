//! Content store contracts.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::error::{Result, StoreError};

/// Content-addressed blob storage behind an upload host.
///
/// Each `put` performs exactly one upload. Retries are the caller's concern.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Base URL every stored path is resolved against.
    fn upload_host(&self) -> &Url;

    /// Store a complete payload under `path`, returning its retrieval URL.
    async fn put(&self, path: &str, content: Bytes) -> Result<Url>;

    /// Retrieval URL for `path` (`{upload_host}/{path}`), without uploading.
    fn url_for(&self, path: &str) -> Result<Url> {
        resolve(self.upload_host(), path)
    }
}

/// Plain retrieval of previously published content.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the raw bytes behind `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Join `path` onto `host`, keeping any path prefix the host carries.
pub fn resolve(host: &Url, path: &str) -> Result<Url> {
    let base = host.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{base}/{path}")).map_err(|e| StoreError::InvalidUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_keeps_host_prefix() {
        let host = Url::parse("https://uploads.example.com/api/").unwrap();
        let url = resolve(&host, "abc.json").unwrap();
        assert_eq!(url.as_str(), "https://uploads.example.com/api/abc.json");
    }

    #[test]
    fn resolve_without_trailing_slash() {
        let host = Url::parse("http://localhost:3000").unwrap();
        let url = resolve(&host, "/0x01.batch").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/0x01.batch");
    }
}
