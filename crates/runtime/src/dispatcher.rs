//! Content resolution and dispatch.
//!
//! Turns one batch-publication event into feed and profile mutations:
//! open the batch, validate each row, fetch and classify its content, then
//! hand the result to the [`StateSink`]. A failing row is logged and skipped
//! without affecting its siblings.

use std::sync::Arc;

use client_blockchain_core::{AnnouncementType, BatchPublication, BlockNumber, Profile};
use client_storage::ContentFetcher;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::activity::ActivityContent;
use crate::announcement::{Announcement, AnnouncementRow};
use crate::api::{BatchError, DispatchError, StateSink};
use crate::batch::BatchResolver;
use crate::events::{DiagnosticEvent, Event, EventBus};
use crate::feed::FeedItem;
use crate::utils::keccak256;

pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Upper bound on content fetches in flight for one batch
    pub max_concurrent_fetches: usize,
    /// Require fetched content to hash to the announcement's content hash
    pub verify_content_hash: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            verify_content_hash: true,
        }
    }
}

/// State change derived from one announcement.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddFeedItem(FeedItem),
    UpsertProfile(Profile),
    /// Content type the feed does not understand
    Ignore,
}

/// Normalize resolved content into the mutation it implies.
pub fn normalize(
    announcement: &Announcement,
    block_number: BlockNumber,
    content: ActivityContent,
) -> Mutation {
    match content {
        ActivityContent::Note(note) => {
            let in_reply_to = match announcement.announcement_type() {
                AnnouncementType::Reply => announcement.in_reply_to().map(str::to_string),
                _ => None,
            };
            Mutation::AddFeedItem(FeedItem {
                from_address: announcement.from_id().clone(),
                hash: *announcement.content_hash(),
                block_number,
                timestamp: note.timestamp_millis(),
                uri: announcement.url().to_string(),
                content: note,
                in_reply_to,
            })
        }
        ActivityContent::Profile(profile) => Mutation::UpsertProfile(Profile::new(
            announcement.from_id().clone(),
            profile.describes,
        )),
        ActivityContent::Unknown => Mutation::Ignore,
    }
}

/// Summary of one batch's dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: usize,
    pub ignored: usize,
    pub skipped: usize,
    /// The batch itself could not be opened; no rows were read
    pub rejected: bool,
}

#[derive(Clone)]
pub struct Dispatcher {
    resolver: BatchResolver,
    fetcher: Arc<dyn ContentFetcher>,
    sink: Arc<dyn StateSink>,
    event_bus: EventBus,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        sink: Arc<dyn StateSink>,
        event_bus: EventBus,
        config: DispatchConfig,
    ) -> Self {
        Self {
            resolver: BatchResolver::new(fetcher.clone()),
            fetcher,
            sink,
            event_bus,
            config,
        }
    }

    /// Process every row of the batch behind `event`.
    ///
    /// Content is fetched concurrently; mutations reach the sink in row order.
    pub async fn handle_batch(&self, event: &BatchPublication) -> BatchReport {
        let mut report = BatchReport::default();

        let reader = match self.resolver.open(&event.file_url, &event.file_hash).await {
            Ok(reader) => reader,
            Err(err) => {
                self.reject_batch(event, &err);
                report.rejected = true;
                return report;
            }
        };

        let block_number = event.block_number;
        let limit = self.config.max_concurrent_fetches.max(1);
        let mut resolved = futures::stream::iter(reader.rows().enumerate())
            .map(move |(index, row)| async move {
                let mutation = match row {
                    Ok(row) => self.resolve_row(row, block_number).await,
                    Err(err) => Err(DispatchError::from(err)),
                };
                (index, mutation)
            })
            .buffered(limit);

        while let Some((index, mutation)) = resolved.next().await {
            let outcome = match mutation {
                Ok(mutation) => self.apply(mutation).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(true) => report.applied += 1,
                Ok(false) => report.ignored += 1,
                Err(err) => {
                    self.skip_row(event, index, &err);
                    report.skipped += 1;
                }
            }
        }

        debug!(
            "Batch {} at block {}: {} applied, {} ignored, {} skipped",
            event.file_url, block_number, report.applied, report.ignored, report.skipped
        );
        report
    }

    /// Validate one row and resolve its content into a mutation.
    pub async fn resolve_row(
        &self,
        row: AnnouncementRow,
        block_number: BlockNumber,
    ) -> Result<Mutation, DispatchError> {
        let announcement = Announcement::try_from(row)?;
        let url = announcement.url();

        let bytes = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| DispatchError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if self.config.verify_content_hash {
            let actual = keccak256(&bytes);
            if actual != *announcement.content_hash() {
                return Err(DispatchError::ContentMismatch {
                    url: url.to_string(),
                    expected: *announcement.content_hash(),
                    actual,
                });
            }
        }

        let content =
            ActivityContent::from_slice(&bytes).map_err(|source| DispatchError::Decode {
                url: url.to_string(),
                source,
            })?;

        Ok(normalize(&announcement, block_number, content))
    }

    /// Returns whether the mutation changed state.
    async fn apply(&self, mutation: Mutation) -> Result<bool, DispatchError> {
        let result = match mutation {
            Mutation::AddFeedItem(item) => self.sink.add_feed_item(item).await,
            Mutation::UpsertProfile(profile) => self.sink.upsert_profile(profile).await,
            Mutation::Ignore => return Ok(false),
        };
        result.map(|_| true).map_err(|_| DispatchError::SinkClosed)
    }

    fn reject_batch(&self, event: &BatchPublication, err: &BatchError) {
        warn!("Discarding batch {}: {}", event.file_url, err);
        self.event_bus
            .publish(Event::Diagnostics(DiagnosticEvent::BatchRejected {
                batch_url: event.file_url.clone(),
                file_hash: event.file_hash,
                block_number: event.block_number,
                error: err.to_string(),
            }));
    }

    fn skip_row(&self, event: &BatchPublication, row: usize, err: &DispatchError) {
        warn!("Skipping row {} of batch {}: {}", row, event.file_url, err);
        self.event_bus
            .publish(Event::Diagnostics(DiagnosticEvent::RowSkipped {
                batch_url: event.file_url.clone(),
                block_number: event.block_number,
                row,
                error: err.to_string(),
            }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{Note, ProfileContent};
    use crate::announcement::{Signature, UnsignedAnnouncement};
    use chrono::{TimeZone, Utc};
    use client_blockchain_core::{ContentHash, ProfileFields, SocialAddress};

    fn note() -> Note {
        let published = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
        Note::compose("hi", &[], published).unwrap()
    }

    fn reply() -> Announcement {
        UnsignedAnnouncement::reply(
            SocialAddress::from("0xAA"),
            "http://store/0x01.json".to_string(),
            ContentHash([1; 32]),
            "dsnp://0xBB/0x02".to_string(),
        )
        .unwrap()
        .with_signature(Signature(vec![]))
    }

    #[test]
    fn note_becomes_feed_item() {
        let Mutation::AddFeedItem(item) = normalize(&reply(), 42, ActivityContent::Note(note()))
        else {
            panic!("expected feed item");
        };
        assert_eq!(item.from_address, SocialAddress::from("0xAA"));
        assert_eq!(item.hash, ContentHash([1; 32]));
        assert_eq!(item.block_number, 42);
        assert_eq!(item.timestamp, note().timestamp_millis());
        assert_eq!(item.uri, "http://store/0x01.json");
        assert_eq!(item.in_reply_to.as_deref(), Some("dsnp://0xBB/0x02"));
    }

    #[test]
    fn profile_uses_announcing_actor() {
        let content = ActivityContent::Profile(ProfileContent::new(ProfileFields::named("Ann")));
        let Mutation::UpsertProfile(profile) = normalize(&reply(), 1, content) else {
            panic!("expected profile");
        };
        assert_eq!(profile.social_address, SocialAddress::from("0xAA"));
        assert_eq!(profile.name(), Some("Ann"));
    }

    #[test]
    fn unknown_content_is_ignored() {
        assert_eq!(normalize(&reply(), 1, ActivityContent::Unknown), Mutation::Ignore);
    }
}
