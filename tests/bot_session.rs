//! Full bot sessions against a scripted local chat server.
//!
//! The server side speaks just enough of the protocol to register the bot,
//! deliver a few messages and then hang up.

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chat_file_grabber::config::ChatSettings;
use chat_file_grabber::{run_bot, Config, DebugLevel};

const NICK: &str = "DadaChan";
const CHANNEL: &str = "#fdlbottest";

fn bot_config(dir: &Path, port: u16, listen_for: &str, debug: DebugLevel) -> Config {
    Config {
        file_dir: dir.to_path_buf(),
        listen_for: listen_for.to_string(),
        debug,
        status_interval: Duration::from_secs(1),
        chat: ChatSettings {
            server: "127.0.0.1".to_string(),
            port,
            nick: NICK.to_string(),
            channels: vec![CHANNEL.to_string()],
            flood_delay: None,
        },
        ..Default::default()
    }
    .validate()
    .unwrap()
}

struct FakeServer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl FakeServer {
    /// Accepts the bot and completes registration up to the channel join.
    async fn accept(listener: TcpListener) -> Self {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, writer) = stream.into_split();
        let mut server = Self {
            lines: BufReader::new(read).lines(),
            writer,
        };

        assert_eq!(server.next_line().await, format!("NICK {NICK}"));
        assert!(server.next_line().await.starts_with("USER "));
        server
            .send(&format!(":irc.test 001 {NICK} :Welcome"))
            .await;
        assert_eq!(server.next_line().await, format!("JOIN {CHANNEL}"));
        server
    }

    async fn next_line(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("bot should answer")
            .unwrap()
            .unwrap()
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\r\n").await.unwrap();
    }

    /// Round-trips a PING so every earlier line is known to be handled.
    async fn sync(&mut self) {
        self.send("PING :sync").await;
        assert_eq!(self.next_line().await, "PONG :sync");
    }
}

async fn file_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/music/song.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("channel song"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secret.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("private song"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_channel_link_downloaded_then_disconnect_is_error() {
    let files = file_server().await;
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let bot = tokio::spawn(run_bot(bot_config(
        dir.path(),
        port,
        "message#",
        DebugLevel::QUIET,
    )));

    let mut server = FakeServer::accept(listener).await;
    let url = format!("{}/music/song.mp3", files.uri());
    server
        .send(&format!(":alice!~a@host PRIVMSG {CHANNEL} :listen {url}"))
        .await;
    server.sync().await;
    drop(server);

    let result = tokio::time::timeout(Duration::from_secs(10), bot)
        .await
        .expect("bot should stop after the server hangs up")
        .unwrap();
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Chat connection ended"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("song.mp3")).unwrap(),
        "channel song"
    );
    let sidecar = std::fs::read_to_string(dir.path().join("song.mp3.txt")).unwrap();
    assert!(sidecar.starts_with(&format!("{CHANNEL}\n<alice> listen {url}\n\n")));
}

#[tokio::test]
async fn test_listener_follows_configured_event() {
    let files = file_server().await;
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let bot = tokio::spawn(run_bot(bot_config(
        dir.path(),
        port,
        "pm",
        DebugLevel::NORMAL,
    )));

    let mut server = FakeServer::accept(listener).await;
    server
        .send(&format!(
            ":alice!~a@host PRIVMSG {CHANNEL} :{}/music/song.mp3",
            files.uri()
        ))
        .await;
    server
        .send(&format!(
            ":bob!~b@host PRIVMSG {NICK} :{}/secret.mp3",
            files.uri()
        ))
        .await;
    server.sync().await;
    drop(server);

    let result = tokio::time::timeout(Duration::from_secs(10), bot)
        .await
        .expect("bot should stop after the server hangs up")
        .unwrap();
    assert!(result.is_err());

    assert!(!dir.path().join("song.mp3").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("secret.mp3")).unwrap(),
        "private song"
    );
    let sidecar = std::fs::read_to_string(dir.path().join("secret.mp3.txt")).unwrap();
    assert!(sidecar.starts_with(&format!("{NICK}\n<bob> ")));
}

#[tokio::test]
async fn test_unreachable_server_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = run_bot(bot_config(dir.path(), port, "message#", DebugLevel::QUIET)).await;
    assert!(result.is_err());
}
