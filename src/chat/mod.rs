//! Chat collaborator: inbound message events and listener registration.
//!
//! The pipeline only depends on [`ChatClient`]; [`irc::IrcClient`] is the
//! concrete client used by the binary.

pub mod irc;

use std::sync::Arc;

use serde::Serialize;

pub use irc::{IrcClient, IrcMessage};

/// Fires for every PRIVMSG.
pub const EVENT_MESSAGE: &str = "message";
/// Fires for PRIVMSGs to any channel. `message#chan` narrows it to `#chan`.
pub const EVENT_CHANNEL_MESSAGE: &str = "message#";
/// Fires for PRIVMSGs addressed to the client's own nick.
pub const EVENT_PRIVATE_MESSAGE: &str = "pm";

/// How the protocol classifies a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Normal,
    Reply,
    Error,
}

/// The underlying protocol event, kept verbatim for provenance records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub command: String,
    pub raw_command: String,
    pub command_type: CommandType,
    pub args: Vec<String>,
}

/// One chat message as delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender nick
    pub nick: String,
    /// Channel name, or the client's own nick for private messages
    pub channel: String,
    pub text: String,
    pub raw: RawEvent,
}

/// Callback invoked synchronously for each matching message.
pub type MessageHandler = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Registration capability exposed by a chat client.
pub trait ChatClient {
    /// Registers `handler` for `event` (see [`is_known_event`]).
    fn add_listener(&mut self, event: &str, handler: MessageHandler);
}

/// Whether `event` is a name listeners can subscribe to.
pub fn is_known_event(event: &str) -> bool {
    match event {
        EVENT_MESSAGE | EVENT_CHANNEL_MESSAGE | EVENT_PRIVATE_MESSAGE => true,
        other => other.strip_prefix(EVENT_MESSAGE).is_some_and(|channel| {
            is_channel_name(channel)
                && channel.len() > 1
                && !channel.contains(|c: char| c.is_whitespace() || c == ',')
        }),
    }
}

/// Returns true for names that start with a channel prefix character.
pub fn is_channel_name(target: &str) -> bool {
    target.starts_with(['#', '&', '+', '!'])
}

/// Event names fired by a PRIVMSG sent to `target`, lower-cased.
pub fn event_names_for(target: &str, own_nick: &str) -> Vec<String> {
    let mut names = vec![EVENT_MESSAGE.to_string()];
    if is_channel_name(target) {
        names.push(EVENT_CHANNEL_MESSAGE.to_string());
        names.push(format!("{EVENT_MESSAGE}{}", target.to_lowercase()));
    } else if target.eq_ignore_ascii_case(own_nick) {
        names.push(EVENT_PRIVATE_MESSAGE.to_string());
    }
    names
}
