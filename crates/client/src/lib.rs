//! Line-oriented front-end for the social client.
//!
//! # Architecture
//!
//! ```text
//! social (binary, composition root)
//!   ├─→ client-bootstrap (config, provider, client assembly)
//!   └─→ social-runtime   (publishing and feed ingestion)
//! ```
//!
//! The binary reads one [`Input`] per stdin line and prints feed events as
//! they arrive.

pub mod input;

pub use input::{Input, parse_line, resync_block};
