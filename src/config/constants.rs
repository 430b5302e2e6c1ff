//! Configuration constants.
//!
//! This module defines the defaults and operational parameters used throughout
//! the application. Defaults mirror a sensible out-of-the-box bot setup.

use std::time::Duration;

/// Directory downloaded files are written to.
pub const DEFAULT_FILE_DIR: &str = "./incoming/";

/// File extensions recognized in chat messages.
pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "nsf", "flac", "ogg", "mp4", "m4a", "wmv", "wma", "ftm", "mod", "it", "s3m",
    "xm",
];

/// Chat event subscribed to by default (messages sent to any channel).
pub const DEFAULT_LISTEN_FOR: &str = "message#";

/// Seconds between status reports.
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 500;

/// Longest accepted status interval (one week).
pub const MAX_STATUS_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// External program used for delegated fetches.
pub const DEFAULT_FETCH_PROGRAM: &str = "wget";

/// Flag passed to the fetch program to skip certificate validation.
pub const FETCH_PROGRAM_NO_CHECK_CERT_FLAG: &str = "--no-check-certificate";

/// Flag passed to the fetch program to name the output file.
pub const FETCH_PROGRAM_OUTPUT_FLAG: &str = "-O";

/// Suffix appended to a downloaded file's path to name its provenance record.
pub const PROVENANCE_SUFFIX: &str = ".txt";

// Chat server defaults
pub const DEFAULT_IRC_SERVER: &str = "irc.esper.net";
pub const DEFAULT_IRC_PORT: u16 = 6667;
pub const DEFAULT_IRC_NICK: &str = "DadaChan";
pub const DEFAULT_IRC_CHANNEL: &str = "#fdlbottest";
/// Delay between outbound chat lines when flood protection is enabled.
pub const DEFAULT_FLOOD_DELAY_MS: u64 = 1000;
/// Longest inbound line accepted from the chat server (RFC limit is 512, IRCv3 tags raise it).
pub const MAX_IRC_LINE_LENGTH: usize = 8192;

// Network operation timeouts
/// TCP connection timeout in seconds for direct downloads and the chat connection.
/// Whole-request timeouts are deliberately absent: transfers may be long.
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent with direct downloads.
pub const DEFAULT_USER_AGENT: &str = concat!("chat_file_grabber/", env!("CARGO_PKG_VERSION"));

/// How long shutdown waits for in-flight downloads before giving up on them.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);
