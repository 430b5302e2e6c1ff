//! Message counters, periodic status lines and end-of-run statistics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

/// Running totals updated by the message pipeline.
#[derive(Debug, Default)]
pub struct MessageStats {
    messages_seen: AtomicUsize,
    matches_found: AtomicUsize,
}

impl MessageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_message(&self) {
        self.messages_seen.fetch_add(1, Ordering::SeqCst);
    }

    /// Counts one message that contained at least one candidate URL.
    pub fn record_match(&self) {
        self.matches_found.fetch_add(1, Ordering::SeqCst);
    }

    pub fn messages_seen(&self) -> usize {
        self.messages_seen.load(Ordering::SeqCst)
    }

    pub fn matches_found(&self) -> usize {
        self.matches_found.load(Ordering::SeqCst)
    }
}

/// Counts accumulated since the previous report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDelta {
    pub messages: usize,
    pub matches: usize,
}

/// Computes per-interval deltas from [`MessageStats`].
///
/// Baselines roll forward on every tick, so each report covers only its own
/// window.
pub struct StatusReporter {
    stats: Arc<MessageStats>,
    interval: Duration,
    messages_last: usize,
    matches_last: usize,
}

impl StatusReporter {
    pub fn new(stats: Arc<MessageStats>, interval: Duration) -> Self {
        Self {
            stats,
            interval,
            messages_last: 0,
            matches_last: 0,
        }
    }

    /// Returns the counts since the last tick and advances the baselines.
    pub fn tick(&mut self) -> StatusDelta {
        let messages = self.stats.messages_seen();
        let matches = self.stats.matches_found();
        let delta = StatusDelta {
            messages: messages.saturating_sub(self.messages_last),
            matches: matches.saturating_sub(self.matches_last),
        };
        self.messages_last = messages;
        self.matches_last = matches;
        delta
    }

    /// Ticks and logs the resulting status line.
    pub fn report(&mut self) {
        let delta = self.tick();
        info!("{}", format_status(self.interval.as_secs(), delta));
    }
}

/// Human-readable status line for one reporting window.
pub fn format_status(interval_secs: u64, delta: StatusDelta) -> String {
    format!(
        "Since the last {} second{}, {} message{} been processed, in which {} file match{} found.",
        interval_secs,
        if interval_secs != 1 { "s" } else { "" },
        delta.messages,
        if delta.messages != 1 { "s have" } else { " has" },
        delta.matches,
        if delta.matches != 1 { "es were" } else { " was" },
    )
}

/// Logs per-category download outcomes.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_info = error_stats.total_info();

    if total_info > 0 {
        info!("Download Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }

    if total_errors > 0 {
        info!("Failure Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }
}

/// Logs the closing summary for a run.
pub fn print_final_statistics(stats: &MessageStats, error_stats: &ProcessingStats) {
    let messages = stats.messages_seen();
    let matches = stats.matches_found();
    info!(
        "Processed {} message{} with {} file match{}",
        messages,
        if messages == 1 { "" } else { "s" },
        matches,
        if matches == 1 { "" } else { "es" }
    );
    print_error_statistics(error_stats);
}
