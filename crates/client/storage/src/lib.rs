//! Content-addressed blob storage for the social client.
//!
//! Content and batch files are uploaded to an upload host and retrieved by
//! plain URL:
//!
//! ```text
//! put(path, bytes)            POST {host}/upload?filename=<path>  → {host}/<path>
//! put_stream(path, writer)    buffered chunks, one upload on finish
//! fetch(url)                  GET {url}
//! ```
//!
//! [`HttpContentStore`] talks to a real upload host; [`MemoryContentStore`]
//! keeps everything in process.

pub mod error;
pub mod http;
pub mod memory;
pub mod store;
pub mod stream;

pub use error::{Result, StoreError};
pub use http::{DEFAULT_REQUEST_TIMEOUT, HttpContentStore, StoreConfig};
pub use memory::MemoryContentStore;
pub use store::{ContentFetcher, ContentStore};
pub use stream::{ChunkSink, put_stream};

pub use reqwest::Url;
