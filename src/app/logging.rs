//! Periodic status logging.

use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::statistics::StatusReporter;

/// Spawns the status loop.
///
/// The first report comes one full interval after the call, then one per
/// interval until `cancel` fires. A period too long to schedule disables
/// reporting but still waits for `cancel`.
pub fn spawn_status_reporter(
    mut reporter: StatusReporter,
    period: std::time::Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::task::spawn(async move {
        let Some(start) = Instant::now().checked_add(period) else {
            warn!("Status interval {period:?} is out of range, status reports disabled");
            cancel.cancelled().await;
            return;
        };
        let mut interval = interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    reporter.report();
                }
                _ = cancel.cancelled() => {
                    debug!("Status reporter stopped");
                    break;
                }
            }
        }
    })
}
