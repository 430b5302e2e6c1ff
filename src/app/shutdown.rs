//! Graceful shutdown handling.

use std::time::Duration;

use log::{info, warn};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Stops background work and waits for in-flight downloads.
///
/// Cancels the status reporter and awaits it, then closes `downloads` to new
/// work and waits up to `grace` for the remaining transfers.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    reporter_task: Option<tokio::task::JoinHandle<()>>,
    downloads: &TaskTracker,
    grace: Duration,
) {
    // Signal reporter task to stop and await it
    cancel.cancel();
    if let Some(reporter_task) = reporter_task {
        let _ = reporter_task.await;
    }

    downloads.close();
    let in_flight = downloads.len();
    if in_flight > 0 {
        info!(
            "Waiting up to {}s for {} download{} in flight",
            grace.as_secs(),
            in_flight,
            if in_flight == 1 { "" } else { "s" }
        );
    }
    if tokio::time::timeout(grace, downloads.wait()).await.is_err() {
        warn!(
            "Abandoning {} unfinished download{} after {}s",
            downloads.len(),
            if downloads.len() == 1 { "" } else { "s" },
            grace.as_secs()
        );
    }
}
