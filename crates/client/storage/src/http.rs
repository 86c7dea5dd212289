//! Upload-host HTTP client implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url};

use crate::error::{Result, StoreError};
use crate::store::{ContentFetcher, ContentStore};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpContentStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upload host (e.g. `https://uploads.example.com`)
    pub upload_host: Url,

    /// Timeout applied to every upload and download
    pub request_timeout: Duration,
}

impl StoreConfig {
    pub fn new(upload_host: Url) -> Self {
        Self {
            upload_host,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Content store backed by the upload host's HTTP API.
///
/// - Upload: `POST {upload_host}/upload?filename=<name>`, success is `201 Created`
/// - Retrieval: `GET {url}`
pub struct HttpContentStore {
    /// Upload host
    upload_host: Url,

    /// HTTP client (carries the request timeout)
    http_client: reqwest::Client,
}

impl HttpContentStore {
    /// Create a store for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            upload_host: config.upload_host,
            http_client,
        })
    }

    /// Upload endpoint for a file name.
    pub fn upload_endpoint(&self, filename: &str) -> String {
        format!(
            "{}/upload?filename={}",
            self.upload_host.as_str().trim_end_matches('/'),
            urlencoding::encode(filename)
        )
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    fn upload_host(&self) -> &Url {
        &self.upload_host
    }

    async fn put(&self, path: &str, content: Bytes) -> Result<Url> {
        let url = self.url_for(path)?;
        let endpoint = self.upload_endpoint(path);

        tracing::debug!("Uploading {} bytes to {}", content.len(), endpoint);

        let response = self
            .http_client
            .post(&endpoint)
            .header("Content-Type", "application/octet-stream")
            .body(content)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let reason = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::UploadRejected {
                path: path.to_string(),
                status: status.as_u16(),
                reason,
            });
        }

        tracing::debug!("✓ Stored {}", url);
        Ok(url)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentStore {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        tracing::debug!("Downloading {}", url);

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(StoreError::FetchFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await?;
        tracing::debug!("✓ Downloaded {}: {} bytes", url, data.len());

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_endpoint_encodes_filename() {
        let config = StoreConfig::new(Url::parse("http://localhost:3000/").unwrap());
        let store = HttpContentStore::new(config).unwrap();
        assert_eq!(
            store.upload_endpoint("a b/c.json"),
            "http://localhost:3000/upload?filename=a%20b%2Fc.json"
        );
    }

    #[test]
    fn url_for_joins_upload_host() {
        let config = StoreConfig::new(Url::parse("http://localhost:3000").unwrap())
            .with_request_timeout(Duration::from_secs(5));
        let store = HttpContentStore::new(config).unwrap();
        assert_eq!(
            store.url_for("0xab.json").unwrap().as_str(),
            "http://localhost:3000/0xab.json"
        );
    }
}
