//! Announcement records.
//!
//! [`AnnouncementRow`] is the raw shape stored in batch files.
//! [`Announcement`] is a validated row: its reply target is present exactly
//! when its type is [`AnnouncementType::Reply`].

use std::fmt;

use client_blockchain_core::{AnnouncementType, ContentHash, SocialAddress};
use serde::{Deserialize, Serialize};

use crate::utils::keccak256;

/// Proof of authorship (64-byte `r || s` for secp256k1 keys).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", hex::encode(&self.0))
    }
}

/// Reasons a row cannot become an [`Announcement`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAnnouncement {
    #[error("unknown announcement type code {0}")]
    UnknownType(u8),

    #[error("reply announcement without a reply target")]
    MissingReplyTarget,

    #[error("{0:?} announcement must not carry a reply target")]
    UnexpectedReplyTarget(AnnouncementType),

    #[error("announcement has an empty {0}")]
    EmptyField(&'static str),
}

/// Raw announcement row as encoded in a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRow {
    pub announcement_type: u8,
    pub from_id: String,
    pub content_hash: ContentHash,
    pub url: String,
    pub in_reply_to: Option<String>,
    pub signature: Vec<u8>,
}

/// Identity reference of an announcement, used as a reply target.
pub fn announcement_uri(from_id: &SocialAddress, content_hash: &ContentHash) -> String {
    format!("dsnp://{}/{}", from_id, content_hash)
}

/// Announcement fields before a signature is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedAnnouncement {
    announcement_type: AnnouncementType,
    from_id: SocialAddress,
    content_hash: ContentHash,
    url: String,
    in_reply_to: Option<String>,
}

impl UnsignedAnnouncement {
    pub fn broadcast(from_id: SocialAddress, url: String, content_hash: ContentHash) -> Self {
        Self {
            announcement_type: AnnouncementType::Broadcast,
            from_id,
            content_hash,
            url,
            in_reply_to: None,
        }
    }

    /// Reply to another announcement. `None` when the target is blank.
    pub fn reply(
        from_id: SocialAddress,
        url: String,
        content_hash: ContentHash,
        in_reply_to: String,
    ) -> Option<Self> {
        if in_reply_to.trim().is_empty() {
            return None;
        }
        Some(Self {
            announcement_type: AnnouncementType::Reply,
            from_id,
            content_hash,
            url,
            in_reply_to: Some(in_reply_to),
        })
    }

    pub fn profile(from_id: SocialAddress, url: String, content_hash: ContentHash) -> Self {
        Self {
            announcement_type: AnnouncementType::Profile,
            from_id,
            content_hash,
            url,
            in_reply_to: None,
        }
    }

    pub fn announcement_type(&self) -> AnnouncementType {
        self.announcement_type
    }

    pub fn from_id(&self) -> &SocialAddress {
        &self.from_id
    }

    /// Digest the author signs.
    ///
    /// Length-prefixed fields so no two announcements share a payload.
    pub fn signing_digest(&self) -> ContentHash {
        let mut payload = vec![self.announcement_type.code()];
        for part in [
            self.from_id.as_str(),
            self.url.as_str(),
            self.in_reply_to.as_deref().unwrap_or_default(),
        ] {
            payload.extend_from_slice(&(part.len() as u32).to_le_bytes());
            payload.extend_from_slice(part.as_bytes());
        }
        payload.extend_from_slice(self.content_hash.as_bytes());
        keccak256(&payload)
    }

    pub fn with_signature(self, signature: Signature) -> Announcement {
        Announcement {
            inner: self,
            signature,
        }
    }
}

/// Immutable, validated record of one social action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    inner: UnsignedAnnouncement,
    signature: Signature,
}

impl Announcement {
    pub fn announcement_type(&self) -> AnnouncementType {
        self.inner.announcement_type
    }

    pub fn from_id(&self) -> &SocialAddress {
        &self.inner.from_id
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.inner.content_hash
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn in_reply_to(&self) -> Option<&str> {
        self.inner.in_reply_to.as_deref()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signing_digest(&self) -> ContentHash {
        self.inner.signing_digest()
    }

    pub fn uri(&self) -> String {
        announcement_uri(self.from_id(), self.content_hash())
    }

    pub fn to_row(&self) -> AnnouncementRow {
        AnnouncementRow {
            announcement_type: self.inner.announcement_type.code(),
            from_id: self.inner.from_id.to_string(),
            content_hash: self.inner.content_hash,
            url: self.inner.url.clone(),
            in_reply_to: self.inner.in_reply_to.clone(),
            signature: self.signature.0.clone(),
        }
    }
}

impl TryFrom<AnnouncementRow> for Announcement {
    type Error = InvalidAnnouncement;

    fn try_from(row: AnnouncementRow) -> Result<Self, Self::Error> {
        let announcement_type = AnnouncementType::from_code(row.announcement_type)
            .ok_or(InvalidAnnouncement::UnknownType(row.announcement_type))?;

        if row.from_id.is_empty() {
            return Err(InvalidAnnouncement::EmptyField("fromId"));
        }
        if row.url.is_empty() {
            return Err(InvalidAnnouncement::EmptyField("url"));
        }

        let in_reply_to = row.in_reply_to.filter(|target| !target.trim().is_empty());
        match (announcement_type, &in_reply_to) {
            (AnnouncementType::Reply, None) => return Err(InvalidAnnouncement::MissingReplyTarget),
            (AnnouncementType::Reply, Some(_)) | (_, None) => {}
            (other, Some(_)) => return Err(InvalidAnnouncement::UnexpectedReplyTarget(other)),
        }

        Ok(Self {
            inner: UnsignedAnnouncement {
                announcement_type,
                from_id: SocialAddress::new(row.from_id),
                content_hash: row.content_hash,
                url: row.url,
                in_reply_to,
            },
            signature: Signature(row.signature),
        })
    }
}
