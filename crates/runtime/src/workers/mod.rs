//! Worker tasks that back the runtime orchestration.
//!
//! The state worker is the single writer of feed and profile state.

mod state;

pub use state::{Command, StateWorker};
