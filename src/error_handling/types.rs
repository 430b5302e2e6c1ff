//! Error type definitions.
//!
//! This module defines all error and info types used throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error creating the download directory.
    #[error("Could not create download directory {path}: {source}")]
    FileDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error types for configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Download directory must not be empty")]
    EmptyFileDir,

    #[error("No file extensions configured")]
    NoExtensions,

    #[error("Invalid file extension: {0:?}")]
    InvalidExtension(String),

    #[error("Status interval must be at least one second")]
    ZeroStatusInterval,

    #[error("Status interval must be at most {max} seconds (got {got})")]
    StatusIntervalTooLong { got: u64, max: u64 },

    #[error("Debug level must be 0, 1 or 2 (got {0})")]
    InvalidDebugLevel(u8),

    #[error("Unknown chat event {0:?} (expected message, message#, message#<channel> or pm)")]
    UnknownEvent(String),

    #[error("Fetch program must not be empty")]
    EmptyFetchProgram,

    #[error("Nickname must not be empty")]
    EmptyNick,
}

/// Error types for a single download attempt.
///
/// Every variant is terminal for that URL: it is logged and counted, never retried.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The server answered with anything other than 200 OK.
    #[error("Received HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Connection or body transfer failed.
    #[error("Transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The destination file could not be created or written.
    #[error("Could not write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external fetch program exited unsuccessfully.
    #[error("{program} exited with {}", describe_exit(.code))]
    ProgramFailed { program: String, code: Option<i32> },

    /// The external fetch program could not be started.
    #[error("Could not run {program}: {source}")]
    ProgramSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// Error types for writing a provenance record.
#[derive(Error, Debug)]
pub enum ProvenanceError {
    /// The record could not be serialized.
    #[error("Could not serialize provenance record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sidecar file could not be written.
    #[error("Could not write provenance record {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error types for deriving a download target from a URL.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("URL has no file name: {0}")]
    NoFileName(String),

    #[error("Refusing unsafe file name {name:?} from {url}")]
    UnsafeFileName { url: String, name: String },
}

/// Error types for the chat connection.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out connecting to {0}")]
    ConnectTimeout(String),

    #[error("Chat connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chat server closed the connection")]
    Disconnected,
}

/// Types of errors that can occur while handling a candidate URL.
///
/// This enum categorizes failure conditions - outcomes where no file (or no
/// provenance record) ends up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Direct-stream failures
    HttpNotFound,    // 404 Not Found
    HttpStatusError, // any other non-200 status
    TransportError,
    FileWriteError,
    // Delegated-fetch failures
    DelegatedProgramFailure,
    DelegatedSpawnFailure,
    // Post-download failures
    ProvenanceWriteFailure,
    // URL could not be mapped to a safe local file name
    InvalidTarget,
}

/// Types of informational metrics recorded while handling candidate URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    FileFound,
    DestinationExists,
    DirectDownload,
    DelegatedDownload,
    DownloadCompleted,
    ProvenanceWritten,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpNotFound => "Not Found (404)",
            ErrorType::HttpStatusError => "Non-OK HTTP status",
            ErrorType::TransportError => "Transport error",
            ErrorType::FileWriteError => "File write error",
            ErrorType::DelegatedProgramFailure => "Fetch program failed",
            ErrorType::DelegatedSpawnFailure => "Fetch program could not start",
            ErrorType::ProvenanceWriteFailure => "Provenance write error",
            ErrorType::InvalidTarget => "Invalid download target",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::FileFound => "Files found",
            InfoType::DestinationExists => "Already retrieved (skipped)",
            InfoType::DirectDownload => "Direct downloads started",
            InfoType::DelegatedDownload => "Delegated downloads started",
            InfoType::DownloadCompleted => "Downloads completed",
            InfoType::ProvenanceWritten => "Provenance records written",
        }
    }
}
