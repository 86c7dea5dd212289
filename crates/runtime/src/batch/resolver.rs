use std::sync::Arc;

use client_blockchain_core::ContentHash;
use client_storage::ContentFetcher;

use super::codec::BatchReader;
use crate::api::BatchError;
use crate::utils::keccak256;

/// Opens batch files referenced by on-chain pointers.
#[derive(Clone)]
pub struct BatchResolver {
    fetcher: Arc<dyn ContentFetcher>,
}

impl BatchResolver {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the batch at `url` and check it against the pointer hash.
    pub async fn open(&self, url: &str, expected: &ContentHash) -> Result<BatchReader, BatchError> {
        let file = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| BatchError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let actual = keccak256(&file);
        if actual != *expected {
            return Err(BatchError::Integrity {
                url: url.to_string(),
                expected: *expected,
                actual,
            });
        }

        tracing::debug!("Opened batch {} ({} bytes)", url, file.len());
        BatchReader::new(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchWriter;
    use bytes::Bytes;
    use client_storage::{MemoryContentStore, Url};

    fn store() -> MemoryContentStore {
        MemoryContentStore::new(Url::parse("http://uploads.local").unwrap())
    }

    #[tokio::test]
    async fn opens_matching_batch() {
        let store = store();
        let batch = BatchWriter::new().finish();
        let bytes: Vec<u8> = batch.chunks().iter().flat_map(|c| c.to_vec()).collect();
        store.insert("http://uploads.local/b.batch", bytes);

        let resolver = BatchResolver::new(Arc::new(store));
        let reader = resolver
            .open("http://uploads.local/b.batch", &batch.hash())
            .await
            .unwrap();
        assert!(reader.read_all().is_empty());
    }

    #[tokio::test]
    async fn hash_mismatch_rejects_batch() {
        let store = store();
        store.insert("http://uploads.local/b.batch", Bytes::from_static(b"ANNB\x01"));

        let resolver = BatchResolver::new(Arc::new(store));
        let err = resolver
            .open("http://uploads.local/b.batch", &ContentHash([0; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::Integrity { .. }));
    }

    #[tokio::test]
    async fn missing_batch_is_a_fetch_error() {
        let resolver = BatchResolver::new(Arc::new(store()));
        let err = resolver
            .open("http://uploads.local/none.batch", &ContentHash([0; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::Fetch { .. }));
    }
}
