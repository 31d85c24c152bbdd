//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::ChatEvent;
use crate::domain::traits::{ChatClient, ClientInfo};

/// Console transport for local development: every stdin line becomes a
/// respond-to event, replies go to stdout.
pub struct ConsoleClient {
    info: ClientInfo,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleClient {
    pub fn new() -> Self {
        Self {
            info: ClientInfo {
                id: "console".to_string(),
                name: "relay-bot".to_string(),
                platform: "console".to_string(),
            },
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for ConsoleClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for ConsoleClient {
    async fn connect(&self) -> Result<(), BotError> {
        tracing::info!("console client ready (dev mode)");
        Ok(())
    }

    async fn send_message(&self, _channel: &str, text: &str) -> Result<(), BotError> {
        println!("[BOT] {}", text);
        Ok(())
    }

    async fn ping(&self) -> Result<(), BotError> {
        tracing::debug!("console ping");
        Ok(())
    }

    async fn next_event(&self) -> Option<ChatEvent> {
        loop {
            let line = self.lines.lock().await.next_line().await.ok()??;
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            return Some(ChatEvent::respond_to("console", line).with_sender("console"));
        }
    }

    fn client_info(&self) -> ClientInfo {
        self.info.clone()
    }
}
