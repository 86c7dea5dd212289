//! Outbound publication of signed announcements.

use std::sync::Arc;

use client_blockchain_core::{Publication, PublicationLog, TransactionId};
use client_storage::{ContentStore, put_stream};

use crate::announcement::Announcement;
use crate::api::PublishError;
use crate::batch::{BATCH_EXTENSION, BatchWriter};

/// Writes batch files and submits their pointers to the publication log.
pub struct PublisherClient {
    store: Arc<dyn ContentStore>,
    log: Arc<dyn PublicationLog>,
}

impl PublisherClient {
    pub fn new(store: Arc<dyn ContentStore>, log: Arc<dyn PublicationLog>) -> Self {
        Self { store, log }
    }

    /// Publish `announcement` as a batch of one.
    pub async fn publish(&self, announcement: &Announcement) -> Result<TransactionId, PublishError> {
        let batch = BatchWriter::encode([announcement])?;
        let path = format!("{}.{}", announcement.content_hash(), BATCH_EXTENSION);

        let url = put_stream(self.store.as_ref(), &path, |sink| {
            for chunk in batch.chunks() {
                sink.write(chunk.clone());
            }
            sink.finish();
        })
        .await?;

        let publication = Publication {
            announcement_type: announcement.announcement_type(),
            file_url: url.to_string(),
            file_hash: batch.hash(),
        };
        let tx = self.log.publish(vec![publication]).await?;

        tracing::info!(
            "Published {:?} announcement from {} in batch {}",
            announcement.announcement_type(),
            announcement.from_id(),
            batch.hash()
        );
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcement::{Signature, UnsignedAnnouncement};
    use crate::batch::BatchReader;
    use crate::utils::keccak256;
    use client_blockchain_core::{AnnouncementType, ContentHash, LocalChain, SocialAddress};
    use client_storage::{MemoryContentStore, Url};

    fn announcement() -> Announcement {
        UnsignedAnnouncement::broadcast(
            SocialAddress::from("0xAA"),
            "http://uploads.local/0x01.json".to_string(),
            ContentHash([1; 32]),
        )
        .with_signature(Signature(vec![9; 64]))
    }

    #[tokio::test]
    async fn publishes_one_pointer_to_uploaded_batch() {
        let store = MemoryContentStore::new(Url::parse("http://uploads.local").unwrap());
        let chain = LocalChain::new();
        let publisher = PublisherClient::new(Arc::new(store.clone()), Arc::new(chain.clone()));

        publisher.publish(&announcement()).await.unwrap();

        let uploads = store.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, format!("{}.batch", ContentHash([1; 32])));

        let published = chain.publications();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].announcement_type, AnnouncementType::Broadcast);
        assert_eq!(published[0].file_hash, keccak256(&uploads[0].1));

        let rows = BatchReader::new(uploads[0].1.clone()).unwrap().read_all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_ref().unwrap(), &announcement().to_row());
    }

    #[tokio::test]
    async fn upload_failure_publishes_nothing() {
        let store = MemoryContentStore::new(Url::parse("http://uploads.local").unwrap());
        store.reject_uploads(true);
        let chain = LocalChain::new();
        let publisher = PublisherClient::new(Arc::new(store), Arc::new(chain.clone()));

        let err = publisher.publish(&announcement()).await.unwrap_err();
        assert!(matches!(err, PublishError::Upload(_)));
        assert!(chain.publications().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let store = MemoryContentStore::new(Url::parse("http://uploads.local").unwrap());
        let chain = LocalChain::new();
        chain.reject_next_publishes(1);
        let publisher = PublisherClient::new(Arc::new(store), Arc::new(chain));

        let err = publisher.publish(&announcement()).await.unwrap_err();
        assert!(matches!(err, PublishError::Transport(_)));
    }
}
