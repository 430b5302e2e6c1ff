//! chat_file_grabber library: watch chat channels and archive linked files
//!
//! This library listens to chat messages, picks out links to files with
//! recognized extensions and downloads each one once into a local directory,
//! leaving a provenance record next to every file.
//!
//! # Example
//!
//! ```no_run
//! use chat_file_grabber::{run_bot, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file_dir: std::path::PathBuf::from("./incoming/"),
//!     extensions: vec!["mp3".to_string(), "xm".to_string()],
//!     ..Default::default()
//! }
//! .validate()?;
//!
//! let report = run_bot(config).await?;
//! println!("Processed {} messages", report.messages);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod app;
pub mod chat;
pub mod config;
pub mod download;
pub mod error_handling;
pub mod extract;
pub mod initialization;
pub mod pipeline;
pub mod provenance;

// Re-export public API
pub use config::{Config, DebugLevel, LogFormat, Opt};
pub use pipeline::MessagePipeline;
pub use run::{run_bot, BotReport};

// Internal run module (wires the collaborators together)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::{debug, info, warn};
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        print_final_statistics, shutdown_gracefully, spawn_status_reporter, MessageStats,
        StatusReporter,
    };
    use crate::chat::IrcClient;
    use crate::config::{Config, SHUTDOWN_GRACE_PERIOD};
    use crate::download::{DelegatedFetcher, DirectFetcher, Dispatcher, SystemProgramRunner};
    use crate::error_handling::{InfoType, ProcessingStats};
    use crate::extract::UrlExtractor;
    use crate::initialization::{init_client, init_file_dir};
    use crate::pipeline::MessagePipeline;

    /// Summary of a bot session.
    #[derive(Debug, Clone)]
    pub struct BotReport {
        /// Messages seen on the subscribed event
        pub messages: usize,
        /// Messages that contained at least one file link
        pub matches: usize,
        /// Files downloaded successfully
        pub downloads_completed: usize,
        /// Per-URL failures of any kind
        pub failures: usize,
    }

    /// Runs the bot until the chat connection ends or Ctrl-C is received.
    ///
    /// # Errors
    ///
    /// Returns an error if startup fails (download directory, HTTP client,
    /// URL pattern) or if the chat connection is lost. Per-URL failures are
    /// only logged and counted.
    pub async fn run_bot(config: Config) -> Result<BotReport> {
        let config = Arc::new(config);

        init_file_dir(&config.file_dir)
            .await
            .context("Failed to prepare download directory")?;

        info!(
            "Will listen for the following file extensions: {}",
            config.extensions.join(", ")
        );
        let extractor = UrlExtractor::new(&config.extensions).context("Failed to build URL pattern")?;
        debug!("Matching pattern: {}", extractor.pattern());

        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let dispatcher = Dispatcher::new(
            Arc::new(DirectFetcher::new(client)),
            Arc::new(DelegatedFetcher::new(
                config.fetch_program.clone(),
                config.check_cert,
                Arc::new(SystemProgramRunner),
            )),
        );

        let stats = Arc::new(MessageStats::new());
        let processing = Arc::new(ProcessingStats::new());
        let pipeline = MessagePipeline::new(
            Arc::clone(&config),
            Arc::new(extractor),
            Arc::new(dispatcher),
            Arc::clone(&stats),
            Arc::clone(&processing),
        );

        let mut irc = IrcClient::new(config.chat.clone());
        pipeline.attach(&mut irc, &config.listen_for);
        info!(
            "Listening for \"{}\", saving files to {}",
            config.listen_for,
            config.file_dir.display()
        );

        let cancel = CancellationToken::new();
        let reporter_task = if config.debug.observability_enabled() {
            Some(spawn_status_reporter(
                StatusReporter::new(Arc::clone(&stats), config.status_interval),
                config.status_interval,
                cancel.child_token(),
            ))
        } else {
            None
        };

        let chat_cancel = cancel.child_token();
        let mut chat_task = tokio::spawn(irc.run(chat_cancel.clone()));
        let chat_result = tokio::select! {
            joined = &mut chat_task => joined,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                chat_cancel.cancel();
                chat_task.await
            }
        };

        shutdown_gracefully(cancel, reporter_task, pipeline.tracker(), SHUTDOWN_GRACE_PERIOD).await;
        print_final_statistics(&stats, &processing);

        match chat_result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e).context("Chat connection ended"),
            Err(join_error) => {
                warn!("Chat task panicked: {:?}", join_error);
                anyhow::bail!("Chat task failed: {join_error}");
            }
        }

        Ok(BotReport {
            messages: stats.messages_seen(),
            matches: stats.matches_found(),
            downloads_completed: processing.get_info_count(InfoType::DownloadCompleted),
            failures: processing.total_errors(),
        })
    }
}
