//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, timeouts, fetch program flags)
//! - CLI option types and parsing
//! - The validated, read-only `Config` shared by every component

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{ChatSettings, Config, DebugLevel, LogFormat, Opt};
