//! Batch file encoding.
//!
//! # Format
//!
//! ```text
//! [4 bytes magic "ANNB"][1 byte version]
//! [u32 length][bincode serialized AnnouncementRow]
//! [u32 length][bincode serialized AnnouncementRow]
//! ...
//! ```
//!
//! Lengths are little-endian. The file is addressed by the keccak-256 of
//! all of its bytes, header included.

use bytes::{Buf, Bytes};
use client_blockchain_core::ContentHash;

use crate::announcement::{Announcement, AnnouncementRow};
use crate::api::BatchError;
use crate::utils::ContentHasher;

pub const BATCH_MAGIC: &[u8; 4] = b"ANNB";
pub const BATCH_VERSION: u8 = 1;
pub const BATCH_EXTENSION: &str = "batch";

const HEADER_LEN: usize = BATCH_MAGIC.len() + 1;
const LEN_PREFIX: usize = 4;

/// A batch file ready for upload: its chunks in order and their digest.
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    chunks: Vec<Bytes>,
    hash: ContentHash,
}

impl EncodedBatch {
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encodes announcements into batch file chunks, one chunk per row.
pub struct BatchWriter {
    chunks: Vec<Bytes>,
    hasher: ContentHasher,
}

impl BatchWriter {
    pub fn new() -> Self {
        let mut header = Vec::with_capacity(HEADER_LEN);
        header.extend_from_slice(BATCH_MAGIC);
        header.push(BATCH_VERSION);

        let mut hasher = ContentHasher::new();
        hasher.update(&header);

        Self {
            chunks: vec![Bytes::from(header)],
            hasher,
        }
    }

    pub fn append(&mut self, announcement: &Announcement) -> Result<(), BatchError> {
        self.append_row(&announcement.to_row())
    }

    /// Append a raw row without validating it.
    pub fn append_row(&mut self, row: &AnnouncementRow) -> Result<(), BatchError> {
        let data = bincode::serialize(row).map_err(BatchError::Encode)?;
        let len = data.len() as u32;

        let mut frame = Vec::with_capacity(LEN_PREFIX + data.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&data);

        self.hasher.update(&frame);
        self.chunks.push(Bytes::from(frame));
        Ok(())
    }

    pub fn finish(self) -> EncodedBatch {
        EncodedBatch {
            chunks: self.chunks,
            hash: self.hasher.finalize(),
        }
    }

    /// Encode a complete batch in one call.
    pub fn encode<'a>(
        announcements: impl IntoIterator<Item = &'a Announcement>,
    ) -> Result<EncodedBatch, BatchError> {
        let mut writer = Self::new();
        for announcement in announcements {
            writer.append(announcement)?;
        }
        Ok(writer.finish())
    }
}

impl Default for BatchWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader over the rows of a verified batch file.
#[derive(Debug, Clone)]
pub struct BatchReader {
    body: Bytes,
}

impl BatchReader {
    /// Check the header and position the reader at the first row.
    pub fn new(mut file: Bytes) -> Result<Self, BatchError> {
        if file.len() < HEADER_LEN || &file[..BATCH_MAGIC.len()] != BATCH_MAGIC {
            return Err(BatchError::BadHeader);
        }
        let version = file[BATCH_MAGIC.len()];
        if version != BATCH_VERSION {
            return Err(BatchError::UnsupportedVersion(version));
        }
        file.advance(HEADER_LEN);
        Ok(Self { body: file })
    }

    /// Lazily decode rows in file order.
    pub fn rows(&self) -> Rows {
        Rows {
            remaining: self.body.clone(),
            index: 0,
        }
    }

    /// Decode every row, stopping at the first framing error.
    pub fn read_all(&self) -> Vec<Result<AnnouncementRow, BatchError>> {
        self.rows().collect()
    }
}

/// Iterator returned by [`BatchReader::rows`].
///
/// A row that fails to decode yields an error and iteration continues with
/// the next frame. A truncated frame ends iteration.
pub struct Rows {
    remaining: Bytes,
    index: usize,
}

impl Iterator for Rows {
    type Item = Result<AnnouncementRow, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.len() < LEN_PREFIX {
            if !self.remaining.is_empty() {
                tracing::warn!("Trailing {} bytes after last batch row", self.remaining.len());
                self.remaining.clear();
            }
            return None;
        }

        let mut prefix = &self.remaining[..LEN_PREFIX];
        let len = prefix.get_u32_le() as usize;
        if self.remaining.len() < LEN_PREFIX + len {
            tracing::warn!("Batch row {} is truncated", self.index);
            self.remaining.clear();
            return None;
        }

        self.remaining.advance(LEN_PREFIX);
        let data = self.remaining.split_to(len);
        let index = self.index;
        self.index += 1;

        Some(
            bincode::deserialize(&data)
                .map_err(|source| BatchError::Decode { index, source }),
        )
    }
}
