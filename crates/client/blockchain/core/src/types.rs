//! Common types shared across the chain boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Block height on the publication chain.
pub type BlockNumber = u64;

/// Keccak-256 digest identifying a content object or batch file.
///
/// Rendered as `0x`-prefixed lowercase hex, which is also its serde form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hex form without the `0x` prefix, used for file names.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({self})")
    }
}

/// Error returned when a string is not a 32-byte hex digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content hash: {0}")]
pub struct InvalidContentHash(pub String);

impl FromStr for ContentHash {
    type Err = InvalidContentHash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| InvalidContentHash(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| InvalidContentHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Stable social identity of an actor (distinct from any wallet address).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocialAddress(pub String);

impl SocialAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SocialAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SocialAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Wallet (externally owned account) address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generic transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionId(pub Vec<u8>);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Kind of social action an announcement declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AnnouncementType {
    Tombstone = 0,
    GraphChange = 1,
    Broadcast = 2,
    Reply = 3,
    Reaction = 4,
    Profile = 5,
}

impl AnnouncementType {
    /// Numeric wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Tombstone),
            1 => Some(Self::GraphChange),
            2 => Some(Self::Broadcast),
            3 => Some(Self::Reply),
            4 => Some(Self::Reaction),
            5 => Some(Self::Profile),
            _ => None,
        }
    }
}

/// Pointer submitted to the publication log for one batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub announcement_type: AnnouncementType,
    pub file_url: String,
    pub file_hash: ContentHash,
}

/// Batch-publication event observed on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPublication {
    pub announcement_type: AnnouncementType,
    pub file_url: String,
    pub file_hash: ContentHash,
    pub block_number: BlockNumber,
}

impl BatchPublication {
    pub fn new(publication: Publication, block_number: BlockNumber) -> Self {
        Self {
            announcement_type: publication.announcement_type,
            file_url: publication.file_url,
            file_hash: publication.file_hash,
            block_number,
        }
    }
}

/// Descriptive profile fields (`describes` in profile content).
///
/// Unknown fields are kept in `extra` so upserts never drop data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Catch-all for fields not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProfileFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Normalized actor record keyed by social address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub social_address: SocialAddress,

    #[serde(flatten)]
    pub fields: ProfileFields,
}

impl Profile {
    pub fn new(social_address: SocialAddress, fields: ProfileFields) -> Self {
        Self {
            social_address,
            fields,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.name.as_deref()
    }
}

/// Follow relationships of one social identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub social_address: SocialAddress,
    pub following: Vec<SocialAddress>,
    pub followers: Vec<SocialAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_graph_is_empty() {
        let graph = Graph {
            social_address: SocialAddress::new("0xAA"),
            ..Graph::default()
        };
        assert_eq!(graph.social_address.as_str(), "0xAA");
        assert!(graph.following.is_empty() && graph.followers.is_empty());
        assert_eq!(SocialAddress::default().as_str(), "");
    }

    #[test]
    fn content_hash_hex_roundtrip() {
        let hash = ContentHash([0xab; 32]);
        let rendered = hash.to_string();
        assert!(rendered.starts_with("0xabab"));
        assert_eq!(rendered.parse::<ContentHash>().unwrap(), hash);
        assert_eq!(hash.to_hex().parse::<ContentHash>().unwrap(), hash);
    }

    #[test]
    fn content_hash_rejects_short_input() {
        assert!("0x1234".parse::<ContentHash>().is_err());
        assert!("not hex".parse::<ContentHash>().is_err());
    }

    #[test]
    fn profile_serializes_flat() {
        let mut fields = ProfileFields::named("Alice");
        fields
            .extra
            .insert("summary".to_string(), serde_json::json!("hi"));
        let profile = Profile::new(SocialAddress::from("0x01"), fields);

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["socialAddress"], "0x01");
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["summary"], "hi");

        let back: Profile = serde_json::from_value(value).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn announcement_type_codes() {
        for ty in [
            AnnouncementType::Tombstone,
            AnnouncementType::Broadcast,
            AnnouncementType::Reply,
            AnnouncementType::Profile,
        ] {
            assert_eq!(AnnouncementType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(AnnouncementType::from_code(42), None);
    }
}
