//! Configuration types and CLI options.
//!
//! `Opt` is the raw command-line/environment surface parsed by clap. It is
//! turned into a validated, immutable `Config` once at startup; nothing
//! downstream ever mutates the configuration.

use std::path::{PathBuf, MAIN_SEPARATOR};
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_FETCH_PROGRAM, DEFAULT_FILE_DIR, DEFAULT_FILE_EXTENSIONS, DEFAULT_FLOOD_DELAY_MS,
    DEFAULT_IRC_CHANNEL, DEFAULT_IRC_NICK, DEFAULT_IRC_PORT, DEFAULT_IRC_SERVER,
    DEFAULT_LISTEN_FOR, DEFAULT_STATUS_INTERVAL_SECS, DEFAULT_USER_AGENT,
    MAX_STATUS_INTERVAL_SECS,
};
use crate::error_handling::ConfigError;

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Debug verbosity, 0 (quiet) to 2 (everything including raw chat events).
///
/// Only affects how much is logged, never what the bot does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DebugLevel(u8);

impl DebugLevel {
    pub const QUIET: DebugLevel = DebugLevel(0);
    pub const NORMAL: DebugLevel = DebugLevel(1);
    pub const VERBOSE: DebugLevel = DebugLevel(2);

    pub fn new(level: u8) -> Result<Self, ConfigError> {
        if level > 2 {
            return Err(ConfigError::InvalidDebugLevel(level));
        }
        Ok(DebugLevel(level))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Status reports and other progress output are only produced when this is true.
    pub fn observability_enabled(self) -> bool {
        self.0 > 0
    }
}

impl From<DebugLevel> for log::LevelFilter {
    fn from(level: DebugLevel) -> Self {
        match level.0 {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

/// Command-line options.
///
/// Every option can also be supplied through the environment variable named
/// next to it, which makes a `.env` file a convenient place for deployment
/// settings.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chat-file-grabber",
    version,
    about = "Watches a chat channel for file links and downloads them with provenance records."
)]
pub struct Opt {
    /// Directory to save downloaded files in
    #[arg(long, env = "FILE_DIR", default_value = DEFAULT_FILE_DIR)]
    pub file_dir: String,

    /// File extensions to listen for (comma separated, no leading dot)
    #[arg(
        long = "ext",
        env = "FILE_EXTENSIONS",
        value_delimiter = ',',
        default_values_t = DEFAULT_FILE_EXTENSIONS.iter().map(|s| s.to_string()).collect::<Vec<_>>()
    )]
    pub extensions: Vec<String>,

    /// Chat event to listen for: message, message#, message#<channel> or pm
    #[arg(long, env = "LISTEN_FOR", default_value = DEFAULT_LISTEN_FOR)]
    pub listen_for: String,

    /// Validate TLS certificates in delegated fetches
    #[arg(long, env = "CHECK_CERT")]
    pub check_cert: bool,

    /// Seconds between status reports
    #[arg(long, env = "STATUS_INTERVAL", default_value_t = DEFAULT_STATUS_INTERVAL_SECS)]
    pub status_interval: u64,

    /// Debug verbosity {0,1,2}
    #[arg(long, env = "DEBUG_LEVEL", default_value_t = 1)]
    pub debug: u8,

    /// Log format: plain or json
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// External program used for non-plain-HTTP downloads
    #[arg(long, env = "FETCH_PROGRAM", default_value = DEFAULT_FETCH_PROGRAM)]
    pub fetch_program: String,

    /// Chat server hostname
    #[arg(long, env = "IRC_SERVER", default_value = DEFAULT_IRC_SERVER)]
    pub server: String,

    /// Chat server port
    #[arg(long, env = "IRC_PORT", default_value_t = DEFAULT_IRC_PORT)]
    pub port: u16,

    /// Nickname to connect with
    #[arg(long, env = "IRC_NICK", default_value = DEFAULT_IRC_NICK)]
    pub nick: String,

    /// Channels to join (comma separated)
    #[arg(
        long = "channel",
        env = "IRC_CHANNELS",
        value_delimiter = ',',
        default_value = DEFAULT_IRC_CHANNEL
    )]
    pub channels: Vec<String>,

    /// Disable spacing of outbound chat lines
    #[arg(long, env = "NO_FLOOD_PROTECTION")]
    pub no_flood_protection: bool,

    /// Milliseconds between outbound chat lines when flood protection is on
    #[arg(long, env = "FLOOD_DELAY_MS", default_value_t = DEFAULT_FLOOD_DELAY_MS)]
    pub flood_delay_ms: u64,
}

/// Connection settings for the chat collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub server: String,
    pub port: u16,
    pub nick: String,
    pub channels: Vec<String>,
    /// `None` disables flood protection.
    pub flood_delay: Option<Duration>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_IRC_SERVER.to_string(),
            port: DEFAULT_IRC_PORT,
            nick: DEFAULT_IRC_NICK.to_string(),
            channels: vec![DEFAULT_IRC_CHANNEL.to_string()],
            flood_delay: Some(Duration::from_millis(DEFAULT_FLOOD_DELAY_MS)),
        }
    }
}

/// Validated application configuration.
///
/// Construct it through [`Config::from_opt`] (or `Config::default()` plus
/// [`Config::validate`] when building one programmatically). Invariants after
/// validation:
/// - `file_dir` ends in a path separator
/// - `extensions` is non-empty, lower-case, without leading dots or whitespace
/// - `status_interval` is between one second and a week
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination directory, always with a trailing separator
    pub file_dir: PathBuf,
    /// Recognized file extensions
    pub extensions: Vec<String>,
    /// Chat event to subscribe to
    pub listen_for: String,
    /// Whether delegated fetches validate TLS certificates
    pub check_cert: bool,
    /// Interval between status reports
    pub status_interval: Duration,
    /// Log verbosity
    pub debug: DebugLevel,
    /// Log format
    pub log_format: LogFormat,
    /// External fetch program
    pub fetch_program: String,
    /// HTTP User-Agent for direct downloads
    pub user_agent: String,
    /// Chat connection settings
    pub chat: ChatSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_dir: PathBuf::from(DEFAULT_FILE_DIR),
            extensions: DEFAULT_FILE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            listen_for: DEFAULT_LISTEN_FOR.to_string(),
            check_cert: false,
            status_interval: Duration::from_secs(DEFAULT_STATUS_INTERVAL_SECS),
            debug: DebugLevel::NORMAL,
            log_format: LogFormat::Plain,
            fetch_program: DEFAULT_FETCH_PROGRAM.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chat: ChatSettings::default(),
        }
    }
}

impl Config {
    /// Builds a validated configuration from parsed command-line options.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if any option fails validation.
    pub fn from_opt(opt: Opt) -> Result<Self, ConfigError> {
        let config = Config {
            file_dir: PathBuf::from(opt.file_dir),
            extensions: opt.extensions,
            listen_for: opt.listen_for,
            check_cert: opt.check_cert,
            status_interval: Duration::from_secs(opt.status_interval),
            debug: DebugLevel::new(opt.debug)?,
            log_format: opt.log_format,
            fetch_program: opt.fetch_program,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chat: ChatSettings {
                server: opt.server,
                port: opt.port,
                nick: opt.nick,
                channels: opt.channels,
                flood_delay: (!opt.no_flood_protection)
                    .then(|| Duration::from_millis(opt.flood_delay_ms)),
            },
        };
        config.validate()
    }

    /// Normalizes and checks the configuration, consuming it.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid setting.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let dir = self.file_dir.to_string_lossy().to_string();
        if dir.trim().is_empty() {
            return Err(ConfigError::EmptyFileDir);
        }
        if !dir.ends_with('/') && !dir.ends_with(MAIN_SEPARATOR) {
            self.file_dir = PathBuf::from(format!("{dir}{MAIN_SEPARATOR}"));
        }

        let mut extensions = Vec::with_capacity(self.extensions.len());
        for raw in &self.extensions {
            let ext = raw.trim().trim_start_matches('.').to_lowercase();
            if ext.is_empty() {
                continue;
            }
            if ext.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidExtension(raw.clone()));
            }
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        if extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        self.extensions = extensions;

        if self.status_interval.is_zero() {
            return Err(ConfigError::ZeroStatusInterval);
        }
        if self.status_interval > Duration::from_secs(MAX_STATUS_INTERVAL_SECS) {
            return Err(ConfigError::StatusIntervalTooLong {
                got: self.status_interval.as_secs(),
                max: MAX_STATUS_INTERVAL_SECS,
            });
        }

        if !crate::chat::is_known_event(&self.listen_for) {
            return Err(ConfigError::UnknownEvent(self.listen_for.clone()));
        }

        if self.fetch_program.trim().is_empty() {
            return Err(ConfigError::EmptyFetchProgram);
        }

        if self.chat.nick.trim().is_empty() {
            return Err(ConfigError::EmptyNick);
        }
        self.chat.channels.retain(|c| !c.trim().is_empty());

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(DebugLevel::QUIET),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(DebugLevel::NORMAL),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(DebugLevel::VERBOSE),
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn test_debug_level_rejects_out_of_range() {
        assert!(DebugLevel::new(2).is_ok());
        assert!(matches!(
            DebugLevel::new(3),
            Err(ConfigError::InvalidDebugLevel(3))
        ));
    }

    #[test]
    fn test_observability_only_above_zero() {
        assert!(!DebugLevel::QUIET.observability_enabled());
        assert!(DebugLevel::NORMAL.observability_enabled());
        assert!(DebugLevel::VERBOSE.observability_enabled());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.file_dir, PathBuf::from("./incoming/"));
        assert_eq!(config.extensions.len(), 14);
        assert_eq!(config.listen_for, "message#");
        assert!(!config.check_cert);
        assert_eq!(config.status_interval, Duration::from_secs(500));
        assert_eq!(config.fetch_program, "wget");
        assert_eq!(config.chat.channels, vec!["#fdlbottest".to_string()]);
    }

    #[test]
    fn test_validate_appends_trailing_separator() {
        let config = Config {
            file_dir: PathBuf::from("./downloads"),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let dir = config.file_dir.to_string_lossy();
        assert!(dir.ends_with('/') || dir.ends_with(MAIN_SEPARATOR));
        assert!(dir.starts_with("./downloads"));
    }

    #[test]
    fn test_validate_keeps_existing_trailing_separator() {
        let config = Config::default().validate().unwrap();
        assert_eq!(config.file_dir, PathBuf::from("./incoming/"));
    }

    #[test]
    fn test_validate_normalizes_extensions() {
        let config = Config {
            extensions: vec![
                ".MP3".to_string(),
                " ogg ".to_string(),
                "mp3".to_string(),
                "".to_string(),
            ],
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.extensions, vec!["mp3".to_string(), "ogg".to_string()]);
    }

    #[test]
    fn test_validate_rejects_no_extensions() {
        let result = Config {
            extensions: vec![" ".to_string()],
            ..Default::default()
        }
        .validate();
        assert!(matches!(result, Err(ConfigError::NoExtensions)));
    }

    #[test]
    fn test_validate_rejects_extension_with_inner_space() {
        let result = Config {
            extensions: vec!["m p3".to_string()],
            ..Default::default()
        }
        .validate();
        assert!(matches!(result, Err(ConfigError::InvalidExtension(_))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let result = Config {
            status_interval: Duration::ZERO,
            ..Default::default()
        }
        .validate();
        assert!(matches!(result, Err(ConfigError::ZeroStatusInterval)));
    }

    #[test]
    fn test_validate_rejects_huge_interval() {
        let result = Config {
            status_interval: Duration::from_secs(u64::MAX),
            ..Default::default()
        }
        .validate();
        assert!(matches!(
            result,
            Err(ConfigError::StatusIntervalTooLong { got: u64::MAX, .. })
        ));

        let week = Config {
            status_interval: Duration::from_secs(MAX_STATUS_INTERVAL_SECS),
            ..Default::default()
        }
        .validate();
        assert!(week.is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_event() {
        let result = Config {
            listen_for: "notice".to_string(),
            ..Default::default()
        }
        .validate();
        assert!(matches!(result, Err(ConfigError::UnknownEvent(_))));
    }

    #[test]
    fn test_from_opt_uses_defaults() {
        let opt = Opt::parse_from(["chat-file-grabber"]);
        let config = Config::from_opt(opt).unwrap();
        assert_eq!(config.extensions.len(), 14);
        assert_eq!(config.debug, DebugLevel::NORMAL);
        assert_eq!(config.chat.port, 6667);
        assert_eq!(config.chat.flood_delay, Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_from_opt_parses_lists_and_flags() {
        let opt = Opt::parse_from([
            "chat-file-grabber",
            "--ext",
            "flac,XM",
            "--channel",
            "#one,#two",
            "--check-cert",
            "--no-flood-protection",
            "--debug",
            "2",
        ]);
        let config = Config::from_opt(opt).unwrap();
        assert_eq!(config.extensions, vec!["flac".to_string(), "xm".to_string()]);
        assert_eq!(
            config.chat.channels,
            vec!["#one".to_string(), "#two".to_string()]
        );
        assert!(config.check_cert);
        assert_eq!(config.chat.flood_delay, None);
        assert_eq!(config.debug, DebugLevel::VERBOSE);
    }

    #[test]
    fn test_from_opt_rejects_debug_three() {
        let opt = Opt::parse_from(["chat-file-grabber", "--debug", "3"]);
        assert!(matches!(
            Config::from_opt(opt),
            Err(ConfigError::InvalidDebugLevel(3))
        ));
    }
}
