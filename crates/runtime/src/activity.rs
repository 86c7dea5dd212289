//! Off-chain activity content.
//!
//! Announcements point at JSON documents tagged by their `type` field. Only
//! `Note` and `Profile` are understood; anything else decodes as
//! [`ActivityContent::Unknown`] and is ignored downstream.

use chrono::{DateTime, Utc};
use client_blockchain_core::ProfileFields;
use serde::{Deserialize, Deserializer, Serialize};

pub const ACTIVITY_STREAMS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

fn default_context() -> String {
    ACTIVITY_STREAMS_CONTEXT.to_string()
}

fn default_link_kind() -> String {
    "Link".to_string()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Content object referenced by an announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActivityContent {
    Note(Note),
    Profile(ProfileContent),
    #[serde(other)]
    Unknown,
}

impl ActivityContent {
    /// Canonical serialized form: JSON with object keys in sorted order.
    ///
    /// Equal content always serializes to equal bytes, so the digest of this
    /// form is a stable content address.
    pub fn canonical_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let value = serde_json::to_value(self)?;
        serde_json::to_vec(&sort_keys(value))
    }

    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// A post or reply body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,

    pub published: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment: Vec<Link>,
}

impl Note {
    /// Compose a note from user text and attached reference URIs.
    ///
    /// Returns `None` when there is nothing to publish.
    pub fn compose(text: &str, references: &[String], published: DateTime<Utc>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() && references.is_empty() {
            return None;
        }

        Some(Self {
            context: default_context(),
            content: text.to_string(),
            published,
            attachment: references.iter().map(Link::new).collect(),
        })
    }

    /// Publication time in milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.published.timestamp_millis()
    }
}

/// Reference attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type", default = "default_link_kind")]
    pub kind: String,

    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            kind: default_link_kind(),
            href: href.into(),
        }
    }
}

/// Profile update body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileContent {
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,

    pub describes: ProfileFields,

    /// Update time; gives equal updates from different actors distinct digests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

impl ProfileContent {
    pub fn new(describes: ProfileFields) -> Self {
        Self {
            context: default_context(),
            describes,
            published: None,
        }
    }

    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn published() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn blank_note_composes_to_nothing() {
        assert!(Note::compose("   ", &[], published()).is_none());
        assert!(Note::compose("", &["https://a".to_string()], published()).is_some());
    }

    #[test]
    fn note_decodes_from_type_tag() {
        let json = br#"{
            "@context": "https://www.w3.org/ns/activitystreams",
            "type": "Note",
            "content": "hi",
            "published": "2021-06-01T12:00:00Z"
        }"#;

        match ActivityContent::from_slice(json).unwrap() {
            ActivityContent::Note(note) => {
                assert_eq!(note.content, "hi");
                assert_eq!(note.published, published());
            }
            other => panic!("expected note, got {other:?}"),
        }
    }

    #[test]
    fn null_note_content_is_empty() {
        let json = br#"{"type": "Note", "content": null, "published": "2021-06-01T12:00:00Z"}"#;
        let ActivityContent::Note(note) = ActivityContent::from_slice(json).unwrap() else {
            panic!("expected note");
        };
        assert_eq!(note.content, "");
    }

    #[test]
    fn profile_publish_time_changes_digest() {
        let fields = ProfileFields::named("Alice");
        let earlier =
            ActivityContent::Profile(ProfileContent::new(fields.clone()).with_published(published()));
        let later = ActivityContent::Profile(
            ProfileContent::new(fields).with_published(published() + chrono::Duration::seconds(1)),
        );
        assert_ne!(
            earlier.canonical_bytes().unwrap(),
            later.canonical_bytes().unwrap()
        );
    }

    #[test]
    fn unrecognised_type_is_unknown() {
        let json = br#"{"type": "Image", "url": "https://x"}"#;
        assert_eq!(
            ActivityContent::from_slice(json).unwrap(),
            ActivityContent::Unknown
        );
    }

    #[test]
    fn profile_keeps_extra_describes_fields() {
        let json = br#"{"type": "Profile", "describes": {"name": "Ann", "summary": "x"}}"#;
        let ActivityContent::Profile(profile) = ActivityContent::from_slice(json).unwrap() else {
            panic!("expected profile");
        };
        assert_eq!(profile.describes.name.as_deref(), Some("Ann"));
        assert!(profile.describes.extra.contains_key("summary"));
    }

    #[test]
    fn canonical_bytes_sort_keys() {
        let note = Note::compose("hello", &["https://a".to_string()], published()).unwrap();
        let bytes = ActivityContent::Note(note).canonical_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let context = text.find("\"@context\"").unwrap();
        let content = text.find("\"content\"").unwrap();
        let kind = text.find("\"type\":\"Note\"").unwrap();
        assert!(context < content && content < kind);
    }
}
