//! Message pipeline and dedup guard.
//!
//! For every inbound message: count it, extract candidate URLs, skip those
//! whose destination already exists and hand the rest to the dispatcher on
//! spawned tasks. A provenance record is written after each successful
//! download. Nothing here blocks the message stream on network or disk.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::app::MessageStats;
use crate::chat::{ChatClient, InboundMessage, MessageHandler};
use crate::config::Config;
use crate::download::{Dispatcher, DownloadTarget, Strategy};
use crate::error_handling::{update_error_stats, ErrorType, InfoType, ProcessingStats};
use crate::extract::UrlExtractor;
use crate::provenance::write_provenance;

/// Shared state for handling messages.
#[derive(Clone)]
pub struct MessagePipeline {
    config: Arc<Config>,
    extractor: Arc<UrlExtractor>,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<MessageStats>,
    processing: Arc<ProcessingStats>,
    tracker: TaskTracker,
}

impl MessagePipeline {
    pub fn new(
        config: Arc<Config>,
        extractor: Arc<UrlExtractor>,
        dispatcher: Arc<Dispatcher>,
        stats: Arc<MessageStats>,
        processing: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            config,
            extractor,
            dispatcher,
            stats,
            processing,
            tracker: TaskTracker::new(),
        }
    }

    /// Message and match counters read by the status reporter.
    pub fn stats(&self) -> &Arc<MessageStats> {
        &self.stats
    }

    pub fn processing_stats(&self) -> &Arc<ProcessingStats> {
        &self.processing
    }

    /// Tracks every download task spawned by this pipeline.
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Handles one message, returning the download tasks it started.
    ///
    /// Must be called from within a Tokio runtime. Returns immediately; the
    /// downloads complete in the background in no particular order.
    pub fn handle_message(&self, message: InboundMessage) -> Vec<JoinHandle<()>> {
        self.stats.record_message();
        debug!("{:?}", message.raw);

        let urls: Vec<String> = self
            .extractor
            .extract(&message.text)
            .into_iter()
            .map(str::to_string)
            .collect();
        if urls.is_empty() {
            return Vec::new();
        }
        self.stats.record_match();

        let message = Arc::new(message);
        let mut handles = Vec::with_capacity(urls.len());
        for url in urls {
            if let Some(handle) = self.handle_url(&url, &message) {
                handles.push(handle);
            }
        }
        handles
    }

    fn handle_url(&self, url: &str, message: &Arc<InboundMessage>) -> Option<JoinHandle<()>> {
        self.processing.increment_info(InfoType::FileFound);

        let target = match DownloadTarget::from_url(url, &self.config.file_dir) {
            Ok(target) => target,
            Err(e) => {
                warn!("{e}");
                self.processing.increment_error(ErrorType::InvalidTarget);
                return None;
            }
        };
        info!("Found file: {}", target.file_name());

        // Advisory only: two messages naming the same file can both pass
        if target.dest.exists() {
            info!("This file has already been retrieved: {}", target.dest.display());
            self.processing.increment_info(InfoType::DestinationExists);
            return None;
        }

        let strategy = Strategy::for_target(&target);
        self.processing.increment_info(strategy.info_type());

        let dispatcher = Arc::clone(&self.dispatcher);
        let processing = Arc::clone(&self.processing);
        let message = Arc::clone(message);
        Some(self.tracker.spawn(async move {
            download_and_record(&dispatcher, &processing, &target, &message).await;
        }))
    }

    /// Wraps the pipeline as a chat listener.
    pub fn handler(&self) -> MessageHandler {
        let pipeline = self.clone();
        Arc::new(move |message: InboundMessage| {
            pipeline.handle_message(message);
        })
    }

    /// Registers the pipeline with `client` for the `event` name.
    pub fn attach<C: ChatClient + ?Sized>(&self, client: &mut C, event: &str) {
        client.add_listener(event, self.handler());
    }
}

/// Fetches one target, then writes its provenance record on success.
async fn download_and_record(
    dispatcher: &Dispatcher,
    processing: &ProcessingStats,
    target: &DownloadTarget,
    message: &InboundMessage,
) {
    if let Err(e) = dispatcher.dispatch(target).await {
        warn!("Download failed: {e}");
        update_error_stats(processing, &e);
        return;
    }

    info!(
        "File {} has been downloaded to {}",
        target.file_name(),
        target.dest.display()
    );
    processing.increment_info(InfoType::DownloadCompleted);

    match write_provenance(target, message).await {
        Ok(path) => {
            debug!("Provenance written to {}", path.display());
            processing.increment_info(InfoType::ProvenanceWritten);
        }
        Err(e) => {
            warn!("{e}");
            processing.increment_error(ErrorType::ProvenanceWriteFailure);
        }
    }
}
