//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger
//! - HTTP client for direct downloads
//! - Download directory
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::path::Path;

use crate::error_handling::InitializationError;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Makes sure the download directory exists.
///
/// Existing directories are left untouched.
///
/// # Errors
///
/// Returns `InitializationError::FileDirError` if the directory cannot be created.
pub async fn init_file_dir(path: &Path) -> Result<(), InitializationError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| InitializationError::FileDirError {
            path: path.to_path_buf(),
            source,
        })
}
