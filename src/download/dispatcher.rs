//! Scheme-based strategy selection.

use std::sync::Arc;

use log::debug;

use super::target::DownloadTarget;
use super::traits::Fetcher;
use crate::error_handling::{DownloadError, InfoType};

/// Which retrieval strategy handles a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Delegated,
}

impl Strategy {
    /// Plain `http` is streamed in-process; every other scheme is delegated.
    pub fn for_target(target: &DownloadTarget) -> Self {
        if target.is_plain_http() {
            Strategy::Direct
        } else {
            Strategy::Delegated
        }
    }

    /// Counter recorded when a download starts with this strategy.
    pub fn info_type(self) -> InfoType {
        match self {
            Strategy::Direct => InfoType::DirectDownload,
            Strategy::Delegated => InfoType::DelegatedDownload,
        }
    }
}

/// Routes each download to the direct or delegated fetcher.
#[derive(Clone)]
pub struct Dispatcher {
    direct: Arc<dyn Fetcher>,
    delegated: Arc<dyn Fetcher>,
}

impl Dispatcher {
    pub fn new(direct: Arc<dyn Fetcher>, delegated: Arc<dyn Fetcher>) -> Self {
        Self { direct, delegated }
    }

    pub fn fetcher_for(&self, strategy: Strategy) -> &dyn Fetcher {
        match strategy {
            Strategy::Direct => self.direct.as_ref(),
            Strategy::Delegated => self.delegated.as_ref(),
        }
    }

    /// Fetches `target` with the strategy its scheme calls for.
    ///
    /// Resolves once, after the chosen fetcher finishes.
    pub async fn dispatch(&self, target: &DownloadTarget) -> Result<(), DownloadError> {
        let fetcher = self.fetcher_for(Strategy::for_target(target));
        debug!("Fetching {} via {} strategy", target.url, fetcher.name());
        fetcher.fetch(target).await
    }
}
