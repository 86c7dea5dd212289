//! Batch files: the container between an on-chain pointer and its rows.

mod codec;
mod resolver;

pub use codec::{
    BATCH_EXTENSION, BATCH_MAGIC, BATCH_VERSION, BatchReader, BatchWriter, EncodedBatch, Rows,
};
pub use resolver::BatchResolver;
