//! Minimal IRC client.
//!
//! Registers, joins the configured channels, keeps the connection alive and
//! turns PRIVMSGs into [`InboundMessage`]s. It never speaks in channels.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{event_names_for, ChatClient, CommandType, InboundMessage, MessageHandler, RawEvent};
use crate::config::{ChatSettings, MAX_IRC_LINE_LENGTH, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::ChatError;

/// A parsed protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parses one line (with or without the trailing CRLF).
    ///
    /// Message tags are skipped. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        if rest.starts_with('@') {
            rest = rest.split_once(' ').map_or("", |(_, r)| r);
        }
        rest = rest.trim_start_matches(' ');

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (p, r) = stripped.split_once(' ').unwrap_or((stripped, ""));
            prefix = Some(p.to_string());
            rest = r.trim_start_matches(' ');
        }

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            let (param, r) = rest.split_once(' ').unwrap_or((rest, ""));
            params.push(param.to_string());
            rest = r;
        }

        Some(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    /// Nick portion of the prefix, if the prefix names a user.
    pub fn source_nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        match prefix.split_once('!') {
            Some((nick, _)) => Some(nick),
            None if !prefix.contains('.') => Some(prefix),
            None => None,
        }
    }

    /// Expands into the event record kept for provenance.
    pub fn to_raw_event(&self) -> RawEvent {
        let (nick, user, host) = match self.prefix.as_deref() {
            Some(prefix) => match prefix.split_once('!') {
                Some((nick, user_host)) => {
                    let (user, host) = match user_host.split_once('@') {
                        Some((u, h)) => (Some(u.to_string()), Some(h.to_string())),
                        None => (Some(user_host.to_string()), None),
                    };
                    (Some(nick.to_string()), user, host)
                }
                None => (self.source_nick().map(str::to_string), None, None),
            },
            None => (None, None, None),
        };

        RawEvent {
            prefix: self.prefix.clone(),
            nick,
            user,
            host,
            command: command_name(&self.command).to_string(),
            raw_command: self.command.clone(),
            command_type: command_type(&self.command),
            args: self.params.clone(),
        }
    }
}

fn command_type(command: &str) -> CommandType {
    match command.parse::<u16>() {
        Ok(code) if (400..600).contains(&code) => CommandType::Error,
        Ok(_) => CommandType::Reply,
        Err(_) => CommandType::Normal,
    }
}

fn command_name(command: &str) -> &str {
    match command {
        "001" => "rpl_welcome",
        "372" => "rpl_motd",
        "376" => "rpl_endofmotd",
        "433" => "err_nicknameinuse",
        other => other,
    }
}

/// Writes protocol lines, spacing them out when flood protection is on.
struct LineWriter<W> {
    writer: W,
    delay: Option<Duration>,
    last_sent: Option<Instant>,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    fn new(writer: W, delay: Option<Duration>) -> Self {
        Self {
            writer,
            delay,
            last_sent: None,
        }
    }

    async fn send(&mut self, line: &str) -> Result<(), ChatError> {
        if let (Some(delay), Some(last)) = (self.delay, self.last_sent) {
            tokio::time::sleep_until(last + delay).await;
        }
        debug!("-> {line}");
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        self.last_sent = Some(Instant::now());
        Ok(())
    }
}

struct LineRead {
    consumed: usize,
    truncated: bool,
}

/// Reads through the next `\n`, keeping at most `limit` bytes in `buf`.
///
/// The rest of an overlong line is consumed and discarded, so memory stays
/// bounded no matter what the peer sends.
async fn read_line_capped<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> std::io::Result<LineRead> {
    let mut consumed = 0;
    let mut truncated = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }
        let (len, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        let room = limit.saturating_sub(buf.len());
        if len > room {
            truncated = true;
        }
        buf.extend_from_slice(&available[..len.min(room)]);
        reader.consume(len);
        consumed += len;
        if done {
            break;
        }
    }
    Ok(LineRead {
        consumed,
        truncated,
    })
}

/// IRC connection settings plus registered listeners.
pub struct IrcClient {
    settings: ChatSettings,
    current_nick: String,
    listeners: HashMap<String, Vec<MessageHandler>>,
}

impl ChatClient for IrcClient {
    fn add_listener(&mut self, event: &str, handler: MessageHandler) {
        self.listeners
            .entry(event.to_lowercase())
            .or_default()
            .push(handler);
    }
}

impl IrcClient {
    pub fn new(settings: ChatSettings) -> Self {
        let current_nick = settings.nick.clone();
        Self {
            settings,
            current_nick,
            listeners: HashMap::new(),
        }
    }

    /// The nick the server currently knows us by.
    pub fn nick(&self) -> &str {
        &self.current_nick
    }

    /// Connects to the configured server and runs until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ChatError` if the connection cannot be established or is lost.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), ChatError> {
        let addr = format!("{}:{}", self.settings.server, self.settings.port);
        info!("Connecting to {addr}");
        let stream = tokio::time::timeout(
            Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            TcpStream::connect(&addr),
        )
        .await
        .map_err(|_| ChatError::ConnectTimeout(addr.clone()))?
        .map_err(|source| ChatError::Connect {
            addr: addr.clone(),
            source,
        })?;

        let (reader, writer) = stream.into_split();
        self.run_on(reader, writer, cancel).await
    }

    /// Drives the protocol over an already-open stream.
    ///
    /// Returns `Ok(())` when `cancel` fires and `ChatError::Disconnected` when
    /// the peer closes the stream.
    pub async fn run_on<R, W>(
        &mut self,
        reader: R,
        writer: W,
        cancel: CancellationToken,
    ) -> Result<(), ChatError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut writer = LineWriter::new(writer, self.settings.flood_delay);

        writer.send(&format!("NICK {}", self.current_nick)).await?;
        writer
            .send(&format!("USER {} 0 * :{}", self.current_nick, self.current_nick))
            .await?;

        let mut buf = Vec::with_capacity(512);
        loop {
            buf.clear();
            let read = tokio::select! {
                _ = cancel.cancelled() => {
                    // Best effort; the server may already be gone
                    let _ = writer.send("QUIT").await;
                    return Ok(());
                }
                read = read_line_capped(&mut reader, &mut buf, MAX_IRC_LINE_LENGTH) => read?,
            };
            if read.consumed == 0 {
                return Err(ChatError::Disconnected);
            }
            if read.truncated {
                warn!("Dropping oversized line ({} bytes)", read.consumed);
                continue;
            }

            let line = String::from_utf8_lossy(&buf);
            let Some(message) = IrcMessage::parse(&line) else {
                continue;
            };
            debug!("<- {}", line.trim_end());
            self.handle(message, &mut writer).await?;
        }
    }

    async fn handle<W: AsyncWrite + Unpin>(
        &mut self,
        message: IrcMessage,
        writer: &mut LineWriter<W>,
    ) -> Result<(), ChatError> {
        match message.command.as_str() {
            "PING" => {
                let token = message.params.first().map_or("", String::as_str);
                writer.send(&format!("PONG :{token}")).await?;
            }
            "001" => {
                if let Some(nick) = message.params.first() {
                    self.current_nick = nick.clone();
                }
                info!("Registered as {}", self.current_nick);
                for channel in &self.settings.channels {
                    writer.send(&format!("JOIN {channel}")).await?;
                }
            }
            "433" => {
                self.current_nick.push('_');
                warn!("Nick in use, retrying as {}", self.current_nick);
                writer.send(&format!("NICK {}", self.current_nick)).await?;
            }
            "JOIN" => {
                if message.source_nick() == Some(self.current_nick.as_str()) {
                    if let Some(channel) = message.params.first() {
                        info!("Joined {channel}");
                    }
                }
            }
            "PRIVMSG" => self.dispatch(&message),
            _ => {}
        }
        Ok(())
    }

    fn dispatch(&self, message: &IrcMessage) {
        let (Some(target), Some(text)) = (message.params.first(), message.params.get(1)) else {
            return;
        };
        let nick = message.source_nick().unwrap_or_default().to_string();
        let raw = message.to_raw_event();

        for event in event_names_for(target, &self.current_nick) {
            if let Some(handlers) = self.listeners.get(&event) {
                for handler in handlers {
                    handler(InboundMessage {
                        nick: nick.clone(),
                        channel: target.clone(),
                        text: text.clone(),
                        raw: raw.clone(),
                    });
                }
            }
        }
    }
}
