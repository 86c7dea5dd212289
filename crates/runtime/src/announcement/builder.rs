//! Outbound announcement construction.
//!
//! Content is stored under its own digest before any announcement refers to
//! it, so every announcement URL resolves to bytes matching its hash.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use client_blockchain_core::{ContentHash, ProfileFields, SocialAddress};
use client_storage::ContentStore;

use super::signing::AnnouncementSigner;
use super::types::{Announcement, UnsignedAnnouncement};
use crate::activity::{ActivityContent, Note, ProfileContent};
use crate::api::{PipelineError, Result};
use crate::utils::keccak256;

/// Post under construction. `content` is `None` when there was nothing to say.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPost {
    pub from_address: SocialAddress,
    pub content: Option<Note>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftProfile {
    pub from_address: SocialAddress,
    pub content: ProfileContent,
}

/// What an announcement declares about its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementKind {
    Broadcast,
    Reply(String),
    Profile,
}

/// Store path of an activity content object.
pub fn content_path(hash: &ContentHash) -> String {
    format!("{hash}.json")
}

pub struct AnnouncementBuilder {
    store: Arc<dyn ContentStore>,
    signer: Arc<dyn AnnouncementSigner>,
}

impl AnnouncementBuilder {
    pub fn new(store: Arc<dyn ContentStore>, signer: Arc<dyn AnnouncementSigner>) -> Self {
        Self { store, signer }
    }

    pub fn build_post(&self, text: &str, references: &[String], actor: SocialAddress) -> DraftPost {
        DraftPost {
            from_address: actor,
            content: Note::compose(text, references, Utc::now()),
        }
    }

    pub fn build_profile(&self, fields: ProfileFields, actor: SocialAddress) -> DraftProfile {
        DraftProfile {
            from_address: actor,
            content: ProfileContent::new(fields).with_published(Utc::now()),
        }
    }

    /// Upload `content` under its canonical digest and return that digest.
    pub async fn store_activity_content(&self, content: &ActivityContent) -> Result<ContentHash> {
        let bytes = content.canonical_bytes().map_err(PipelineError::Serialize)?;
        let hash = keccak256(&bytes);
        let url = self
            .store
            .put(&content_path(&hash), Bytes::from(bytes))
            .await?;
        tracing::debug!("Stored activity content {} at {}", hash, url);
        Ok(hash)
    }

    /// Build and sign an announcement for content already stored under `hash`.
    ///
    /// Returns `Ok(None)` for a reply with a blank target.
    pub async fn build_and_sign(
        &self,
        hash: ContentHash,
        actor: &SocialAddress,
        kind: AnnouncementKind,
    ) -> Result<Option<Announcement>> {
        let url = self.store.url_for(&content_path(&hash))?.to_string();

        let unsigned = match kind {
            AnnouncementKind::Broadcast => {
                UnsignedAnnouncement::broadcast(actor.clone(), url, hash)
            }
            AnnouncementKind::Profile => UnsignedAnnouncement::profile(actor.clone(), url, hash),
            AnnouncementKind::Reply(in_reply_to) => {
                match UnsignedAnnouncement::reply(actor.clone(), url, hash, in_reply_to) {
                    Some(unsigned) => unsigned,
                    None => {
                        tracing::debug!("Skipping reply without a target");
                        return Ok(None);
                    }
                }
            }
        };

        let signature = self.signer.sign(actor, &unsigned.signing_digest()).await?;
        Ok(Some(unsigned.with_signature(signature)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcement::KeyringSigner;
    use chrono::TimeZone;
    use client_blockchain_core::AnnouncementType;
    use client_storage::{MemoryContentStore, Url};

    fn setup() -> (MemoryContentStore, Arc<KeyringSigner>, AnnouncementBuilder) {
        let store = MemoryContentStore::new(Url::parse("http://uploads.local").unwrap());
        let signer = Arc::new(KeyringSigner::new());
        signer
            .insert_key(SocialAddress::from("0xAA"), [3u8; 32])
            .unwrap();
        let builder = AnnouncementBuilder::new(Arc::new(store.clone()), signer.clone());
        (store, signer, builder)
    }

    fn note(text: &str) -> ActivityContent {
        let published = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
        ActivityContent::Note(Note::compose(text, &[], published).unwrap())
    }

    #[tokio::test]
    async fn storing_is_deterministic() {
        let (store, _, builder) = setup();

        let first = builder.store_activity_content(&note("hello")).await.unwrap();
        let second = builder.store_activity_content(&note("hello")).await.unwrap();
        assert_eq!(first, second);

        let uploads = store.uploads();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0], uploads[1]);
        assert_eq!(uploads[0].0, format!("{first}.json"));
        assert_eq!(keccak256(&uploads[0].1), first);
    }

    #[tokio::test]
    async fn reply_carries_target_and_broadcast_does_not() {
        let (_, signer, builder) = setup();
        let actor = SocialAddress::from("0xAA");
        let hash = builder.store_activity_content(&note("hi")).await.unwrap();

        let reply = builder
            .build_and_sign(hash, &actor, AnnouncementKind::Reply("dsnp://0xBB/0x01".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.announcement_type(), AnnouncementType::Reply);
        assert_eq!(reply.in_reply_to(), Some("dsnp://0xBB/0x01"));
        assert_eq!(reply.url(), format!("http://uploads.local/{hash}.json"));
        signer
            .verify(&actor, &reply.signing_digest(), reply.signature())
            .unwrap();

        let broadcast = builder
            .build_and_sign(hash, &actor, AnnouncementKind::Broadcast)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(broadcast.in_reply_to(), None);
    }

    #[tokio::test]
    async fn blank_reply_target_is_a_no_op() {
        let (_, _, builder) = setup();
        let built = builder
            .build_and_sign(
                ContentHash([1; 32]),
                &SocialAddress::from("0xAA"),
                AnnouncementKind::Reply(" ".into()),
            )
            .await
            .unwrap();
        assert!(built.is_none());
    }

    #[test]
    fn blank_post_has_no_content() {
        let (_, _, builder) = setup();
        let draft = builder.build_post("  ", &[], SocialAddress::from("0xAA"));
        assert!(draft.content.is_none());

        let draft = builder.build_post("hi", &["https://x".to_string()], SocialAddress::from("0xAA"));
        let content = draft.content.unwrap();
        assert_eq!(content.attachment.len(), 1);
        assert_eq!(content.attachment[0].href, "https://x");
    }
}
