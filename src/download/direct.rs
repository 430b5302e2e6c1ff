//! Direct-stream retrieval over plain HTTP.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use reqwest::StatusCode;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::target::DownloadTarget;
use super::traits::Fetcher;
use crate::error_handling::DownloadError;

/// Streams the response body straight into the destination file.
///
/// Only a `200 OK` response is accepted. The file is created after the status
/// check, so a rejected response leaves nothing on disk; a failure while
/// streaming removes the partial file.
pub struct DirectFetcher {
    client: Arc<reqwest::Client>,
}

impl DirectFetcher {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for DirectFetcher {
    async fn fetch(&self, target: &DownloadTarget) -> Result<(), DownloadError> {
        let response = self
            .client
            .get(&target.url)
            .send()
            .await
            .map_err(|source| DownloadError::Transport {
                url: target.url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::HttpStatus {
                url: target.url.clone(),
                status: status.as_u16(),
            });
        }

        debug!(
            "Streaming {} ({} bytes announced) to {}",
            target.url,
            response
                .content_length()
                .map_or_else(|| "unknown".to_string(), |len| len.to_string()),
            target.dest.display()
        );

        let file = File::create(&target.dest)
            .await
            .map_err(|source| DownloadError::FileWrite {
                path: target.dest.clone(),
                source,
            })?;

        if let Err(e) = stream_body(response, file, target).await {
            remove_partial(&target.dest).await;
            return Err(e);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Copies the body chunk by chunk, then flushes, syncs and closes the file.
async fn stream_body(
    response: reqwest::Response,
    mut file: File,
    target: &DownloadTarget,
) -> Result<(), DownloadError> {
    let write_err = |source| DownloadError::FileWrite {
        path: target.dest.clone(),
        source,
    };

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|source| DownloadError::Transport {
            url: target.url.clone(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_err)?;
    }

    file.flush().await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    drop(file);
    Ok(())
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove partial file {}: {}", path.display(), e);
        }
    }
}
