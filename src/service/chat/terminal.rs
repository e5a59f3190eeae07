//! Terminal chat client reading from stdin and writing to stdout.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout},
    sync::Mutex,
};
use tracing::{debug, instrument, warn};

use crate::base::types::{ConversationTurn, CrisisResource, Res, Speaker, Void};

use super::{ChatClient, GenericChatClient};

/// Commands that end a session.
const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

// Extra methods on `ChatClient` applied by the terminal implementation.

impl ChatClient {
    /// Creates a new terminal chat client.
    pub fn terminal() -> Self {
        Self::new(Arc::new(TerminalChatClient::new()))
    }
}

// Specific implementations.

/// Terminal client implementation.
pub struct TerminalChatClient {
    input: Mutex<BufReader<Stdin>>,
    output: Mutex<Stdout>,
}

impl TerminalChatClient {
    /// Create a new terminal chat client.
    #[instrument(name = "TerminalChatClient::new", skip_all)]
    pub fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin())),
            output: Mutex::new(tokio::io::stdout()),
        }
    }

    async fn write(&self, text: &str) -> Void {
        let mut output = self.output.lock().await;
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;

        Ok(())
    }
}

impl Default for TerminalChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenericChatClient for TerminalChatClient {
    async fn read_message(&self) -> Res<Option<String>> {
        self.write("> ").await?;

        let mut buf = Vec::new();
        let read = self.input.lock().await.read_until(b'\n', &mut buf).await?;

        if read == 0 {
            return Ok(None);
        }

        let line = decode_line(&buf);

        if is_quit_command(&line) {
            debug!("Quit command received.");
            return Ok(None);
        }

        Ok(Some(line))
    }

    async fn show_typing(&self, assistant_name: &str) -> Void {
        self.write(&format!("{assistant_name} is typing...\n")).await
    }

    async fn send_turn(&self, assistant_name: &str, turn: &ConversationTurn) -> Void {
        self.write(&format_turn(assistant_name, turn)).await
    }

    async fn show_crisis_resources(&self, resources: &[CrisisResource]) -> Void {
        self.write(&format_crisis_resources(resources)).await
    }
}

// Helpers.

fn is_quit_command(line: &str) -> bool {
    let line = line.trim();
    QUIT_COMMANDS.iter().any(|c| line.eq_ignore_ascii_case(c))
}

/// Decode one raw input line, replacing invalid UTF-8 and dropping the line ending.
fn decode_line(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);

    if matches!(text, std::borrow::Cow::Owned(_)) {
        warn!("Input contained invalid UTF-8; replaced the offending bytes.");
    }

    text.trim_end_matches(['\n', '\r']).to_string()
}

fn format_turn(assistant_name: &str, turn: &ConversationTurn) -> String {
    let speaker = match turn.speaker() {
        Speaker::User => "You",
        Speaker::System => assistant_name,
    };

    format!("[{}] {speaker}: {}\n", turn.timestamp().format("%H:%M"), turn.text())
}

/// Render crisis resources as a block of plain text, one resource per line.
pub fn format_crisis_resources(resources: &[CrisisResource]) -> String {
    let mut out = String::from("\n*** You don't have to face this alone. Reach out now: ***\n");

    for resource in resources {
        out.push_str(&format!("  - {}: {}", resource.name, resource.phone));

        if !resource.description.is_empty() {
            out.push_str(&format!(" ({})", resource.description));
        }

        out.push('\n');
    }

    out.push('\n');
    out
}

// Tests.
