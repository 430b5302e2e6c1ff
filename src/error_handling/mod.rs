//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions for configuration, downloads, provenance and chat
//! - Processing statistics tracking (failure and info counters)
//! - Categorization of download failures
//!
//! Every per-URL failure is terminal for that URL and reported through
//! logging and these counters only; none of them stops the message stream.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_download_error, update_error_stats};
pub use stats::ProcessingStats;
pub use types::{
    ChatError, ConfigError, DownloadError, ErrorType, InfoType, InitializationError,
    ProvenanceError, TargetError,
};
