//! Provenance records written next to each downloaded file.
//!
//! A record is a small text file (`<dest>.txt`) holding the channel, a
//! transcript line for the triggering message and a JSON block with the
//! source URL, destination and raw protocol event.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::chat::{InboundMessage, RawEvent};
use crate::download::{sidecar_path, DownloadTarget};
use crate::error_handling::ProvenanceError;

/// Structured part of a provenance record.
#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceRecord<'a> {
    #[serde(rename = "fileURL")]
    pub file_url: &'a str,
    #[serde(rename = "fileDestination")]
    pub file_destination: String,
    #[serde(rename = "rawMessage")]
    pub raw_message: &'a RawEvent,
}

impl<'a> ProvenanceRecord<'a> {
    pub fn new(target: &'a DownloadTarget, message: &'a InboundMessage) -> Self {
        Self {
            file_url: &target.url,
            file_destination: target.dest.to_string_lossy().to_string(),
            raw_message: &message.raw,
        }
    }
}

/// Renders the sidecar text.
///
/// Layout: channel, newline, `<nick> text`, blank line, pretty-printed JSON
/// with two-space indentation.
pub fn render(
    channel: &str,
    nick: &str,
    text: &str,
    record: &ProvenanceRecord<'_>,
) -> Result<String, ProvenanceError> {
    let json = serde_json::to_string_pretty(record)?;
    Ok(format!("{channel}\n<{nick}> {text}\n\n{json}"))
}

/// Writes the provenance record for a completed download.
///
/// Must only be called once the file at `target.dest` is complete. An
/// existing sidecar is overwritten. Returns the sidecar path.
pub async fn write_provenance(
    target: &DownloadTarget,
    message: &InboundMessage,
) -> Result<PathBuf, ProvenanceError> {
    let record = ProvenanceRecord::new(target, message);
    let contents = render(&message.channel, &message.nick, &message.text, &record)?;
    let path = sidecar_path(&target.dest);
    write_sidecar(&path, contents).await?;
    Ok(path)
}

async fn write_sidecar(path: &Path, contents: String) -> Result<(), ProvenanceError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ProvenanceError::Write {
            path: path.to_path_buf(),
            source,
        })
}
