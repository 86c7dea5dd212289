//! Normalized feed state derived from inbound announcements.

use std::collections::HashMap;

use client_blockchain_core::{BlockNumber, ContentHash, Profile, SocialAddress};
use serde::{Deserialize, Serialize};

use crate::activity::Note;

/// One post or reply as it appears in the feed.
///
/// Created only by the dispatcher and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub from_address: SocialAddress,
    pub hash: ContentHash,
    pub block_number: BlockNumber,
    /// Milliseconds since the Unix epoch of the note's `published` time
    pub timestamp: i64,
    pub uri: String,
    pub content: Note,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
}

impl FeedItem {
    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some()
    }
}

/// Feed items in arrival order and the profile cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub feed: Vec<FeedItem>,
    pub profiles: HashMap<SocialAddress, Profile>,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feed_item(&mut self, item: FeedItem) {
        self.feed.push(item);
    }

    /// Insert or replace the profile for its social address.
    pub fn upsert_profile(&mut self, profile: Profile) {
        self.profiles
            .insert(profile.social_address.clone(), profile);
    }

    pub fn clear_feed_items(&mut self) -> usize {
        let cleared = self.feed.len();
        self.feed.clear();
        cleared
    }

    pub fn profile(&self, address: &SocialAddress) -> Option<&Profile> {
        self.profiles.get(address)
    }

    /// Posts by `address` that are not replies.
    pub fn post_count(&self, address: &SocialAddress) -> usize {
        self.feed
            .iter()
            .filter(|item| &item.from_address == address && !item.is_reply())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use client_blockchain_core::ProfileFields;

    fn item(from: &str, in_reply_to: Option<&str>) -> FeedItem {
        let published = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        FeedItem {
            from_address: SocialAddress::from(from),
            hash: ContentHash([0; 32]),
            block_number: 1,
            timestamp: published.timestamp_millis(),
            uri: "http://x".to_string(),
            content: Note::compose("hi", &[], published).unwrap(),
            in_reply_to: in_reply_to.map(str::to_string),
        }
    }

    #[test]
    fn profile_upsert_is_last_write_wins() {
        let mut state = FeedState::new();
        let address = SocialAddress::from("0xCC");
        state.upsert_profile(Profile::new(address.clone(), ProfileFields::named("A")));
        state.upsert_profile(Profile::new(address.clone(), ProfileFields::named("B")));

        assert_eq!(state.profiles.len(), 1);
        assert_eq!(state.profile(&address).and_then(Profile::name), Some("B"));
    }

    #[test]
    fn post_count_skips_replies() {
        let mut state = FeedState::new();
        state.add_feed_item(item("0xAA", None));
        state.add_feed_item(item("0xAA", Some("dsnp://0xBB/0x01")));
        state.add_feed_item(item("0xBB", None));

        assert_eq!(state.post_count(&SocialAddress::from("0xAA")), 1);
        assert_eq!(state.clear_feed_items(), 3);
        assert!(state.feed.is_empty());
    }
}
