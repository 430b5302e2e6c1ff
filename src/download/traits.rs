//! Core trait definitions for retrieval strategies.

use async_trait::async_trait;

use super::target::DownloadTarget;
use crate::error_handling::DownloadError;

/// A way of retrieving a URL into a local file.
///
/// Implementations resolve exactly once per call: `Ok(())` means the
/// destination holds the complete file and every handle to it is closed;
/// `Err` means the attempt failed and is not retried.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve `target.url` into `target.dest`.
    async fn fetch(&self, target: &DownloadTarget) -> Result<(), DownloadError>;

    /// Short name of this strategy, used in logs.
    fn name(&self) -> &'static str;
}
