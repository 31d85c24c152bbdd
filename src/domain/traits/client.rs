use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::ChatEvent;

/// ChatClient trait - abstraction for the chat transport connection
///
/// Implementations must tolerate interleaved calls from multiple tasks:
/// the dispatch loop and the keep-alive worker share one client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Open the persistent connection to the chat server
    async fn connect(&self) -> Result<(), BotError>;

    /// Send a text message to a channel
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError>;

    /// Lightweight liveness signal over the open connection
    async fn ping(&self) -> Result<(), BotError>;

    /// Receive the next classified event. `None` means the transport is
    /// closed and the dispatch loop should end.
    async fn next_event(&self) -> Option<ChatEvent>;

    /// Get client info
    fn client_info(&self) -> ClientInfo;
}

/// Client information
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub id: String,
    pub name: String,
    pub platform: String,
}
