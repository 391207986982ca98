//! Viewer-driven chunk streaming: window passes, collision passes and eviction.
#![forbid(unsafe_code)]

mod config;
mod manager;

pub use config::StreamingConfig;
pub use manager::{StreamingManager, StreamingStats};
