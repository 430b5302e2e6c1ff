//! Error categorization.
//!
//! This module maps download failures onto the `ErrorType` counters.

use super::stats::ProcessingStats;
use super::types::{DownloadError, ErrorType};

/// Categorizes a `DownloadError` into an `ErrorType`.
///
/// # Arguments
///
/// * `error` - The download failure to categorize
///
/// # Returns
///
/// The appropriate `ErrorType` for the error.
pub fn categorize_download_error(error: &DownloadError) -> ErrorType {
    match error {
        DownloadError::HttpStatus { status: 404, .. } => ErrorType::HttpNotFound,
        DownloadError::HttpStatus { .. } => ErrorType::HttpStatusError,
        DownloadError::Transport { source, .. } => {
            // reqwest reports status errors through the same type; keep them with the status buckets
            match source.status() {
                Some(status) if status.as_u16() == 404 => ErrorType::HttpNotFound,
                Some(_) => ErrorType::HttpStatusError,
                None => ErrorType::TransportError,
            }
        }
        DownloadError::FileWrite { .. } => ErrorType::FileWriteError,
        DownloadError::ProgramFailed { .. } => ErrorType::DelegatedProgramFailure,
        DownloadError::ProgramSpawn { .. } => ErrorType::DelegatedSpawnFailure,
    }
}

/// Records a download failure in the processing statistics.
pub fn update_error_stats(stats: &ProcessingStats, error: &DownloadError) {
    stats.increment_error(categorize_download_error(error));
}
