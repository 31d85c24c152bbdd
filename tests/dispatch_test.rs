//! Dispatch fan-out integration tests
//! Run with: cargo test --test dispatch_test

use std::sync::Arc;

use async_trait::async_trait;

use relay_bot::application::errors::BotError;
use relay_bot::application::routing::Dispatcher;
use relay_bot::domain::entities::{ChatEvent, EventCategory};
use relay_bot::domain::traits::{ChatClient, ClientInfo};
use relay_bot::plugins::registry::{Handler, HandlerContext, PatternFlags, Registry};

/// Records outgoing messages; never produces events.
struct RecordingClient {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingClient {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn connect(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }

    async fn ping(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn next_event(&self) -> Option<ChatEvent> {
        None
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo {
            id: "recording".to_string(),
            name: "recording".to_string(),
            platform: "test".to_string(),
        }
    }
}

fn replying(reply: &str) -> Handler {
    let reply = reply.to_string();
    Arc::new(move |_ctx: &HandlerContext| Ok(Some(reply.clone())))
}

#[tokio::test]
async fn overlapping_patterns_fan_out_in_registration_order() {
    let mut registry = Registry::new();
    registry
        .register(EventCategory::RespondTo, "^hello", PatternFlags::default(), "h1", replying("from H1"))
        .unwrap();
    registry
        .register(EventCategory::RespondTo, "hello", PatternFlags::default(), "h2", replying("from H2"))
        .unwrap();

    let client = RecordingClient::new();
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::clone(&client) as Arc<dyn ChatClient>,
        None,
    );

    dispatcher
        .dispatch(ChatEvent::respond_to("chan", "hello world"))
        .await;

    assert_eq!(
        client.sent(),
        vec![
            ("chan".to_string(), "from H1".to_string()),
            ("chan".to_string(), "from H2".to_string()),
        ]
    );
}

#[tokio::test]
async fn captures_reach_the_handler() {
    let mut registry = Registry::new();
    registry
        .register(
            EventCategory::RespondTo,
            r"^order (\d+)$",
            PatternFlags::default(),
            "order",
            Arc::new(|ctx: &HandlerContext| {
                Ok(Some(format!("order {} confirmed", ctx.capture(0).unwrap_or("?"))))
            }),
        )
        .unwrap();

    let client = RecordingClient::new();
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::clone(&client) as Arc<dyn ChatClient>,
        None,
    );

    dispatcher
        .dispatch(ChatEvent::respond_to("chan", "order 42"))
        .await;

    assert_eq!(
        client.sent(),
        vec![("chan".to_string(), "order 42 confirmed".to_string())]
    );
}

#[tokio::test]
async fn failing_handler_does_not_stop_later_matches() {
    let mut registry = Registry::new();
    registry
        .register(
            EventCategory::ListenTo,
            "topic",
            PatternFlags::default(),
            "broken",
            Arc::new(|_ctx: &HandlerContext| Err(BotError::Handler("boom".to_string()))),
        )
        .unwrap();
    registry
        .register(EventCategory::ListenTo, "topic", PatternFlags::default(), "ok", replying("still here"))
        .unwrap();

    let client = RecordingClient::new();
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::clone(&client) as Arc<dyn ChatClient>,
        None,
    );

    dispatcher
        .dispatch(ChatEvent::listen_to("chan", "new topic today"))
        .await;

    assert_eq!(
        client.sent(),
        vec![("chan".to_string(), "still here".to_string())]
    );
}

#[tokio::test]
async fn default_reply_only_applies_to_respond_to_events() {
    let mut registry = Registry::new();
    registry
        .register(EventCategory::RespondTo, "^hi$", PatternFlags::default(), "hi", replying("hi!"))
        .unwrap();

    let client = RecordingClient::new();
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::clone(&client) as Arc<dyn ChatClient>,
        Some("default answer".to_string()),
    );

    // Unmatched listen_to event: silence
    dispatcher
        .dispatch(ChatEvent::listen_to("chan", "nothing matches this"))
        .await;
    assert!(client.sent().is_empty());

    // Unmatched respond_to event: default reply
    dispatcher
        .dispatch(ChatEvent::respond_to("chan", "nothing matches this"))
        .await;
    assert_eq!(
        client.sent(),
        vec![("chan".to_string(), "default answer".to_string())]
    );
}
