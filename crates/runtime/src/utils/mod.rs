//! Small helpers shared across the pipeline.

pub mod hash;

pub use hash::{ContentHasher, keccak256};
