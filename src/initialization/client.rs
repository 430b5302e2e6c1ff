//! HTTP client initialization.
//!
//! This module provides the client used by direct-stream downloads.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, TCP_CONNECT_TIMEOUT_SECS};
use reqwest::ClientBuilder;

/// Initializes the HTTP client for direct downloads.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - A TCP connect timeout (no whole-request timeout, transfers may be long)
/// - Redirects disabled, so a 3xx is reported as a failed status
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(Arc::new(client))
}
