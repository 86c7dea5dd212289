//! Content hashing.
//!
//! Every content object and batch file is addressed by its keccak-256 digest.

use client_blockchain_core::ContentHash;
use sha3::{Digest, Keccak256};

/// Keccak-256 of `bytes`.
pub fn keccak256(bytes: &[u8]) -> ContentHash {
    ContentHash(Keccak256::digest(bytes).into())
}

/// Incremental keccak-256 for content written in chunks.
#[derive(Default)]
pub struct ContentHasher {
    inner: Keccak256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    pub fn finalize(self) -> ContentHash {
        ContentHash(self.inner.finalize().into())
    }
}
