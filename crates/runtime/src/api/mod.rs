//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or transport.

pub mod errors;
pub mod handle;
pub mod sink;

pub use errors::{
    BatchError, DispatchError, PipelineError, PublishError, Result, SigningError,
};
pub use handle::StateHandle;
pub use sink::StateSink;
