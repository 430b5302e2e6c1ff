//! Main application modules.
//!
//! This module provides the status reporter, shutdown handling and statistics
//! printing used by the main application.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::spawn_status_reporter;
pub use shutdown::shutdown_gracefully;
pub use statistics::{
    format_status, print_error_statistics, print_final_statistics, MessageStats, StatusDelta,
    StatusReporter,
};
