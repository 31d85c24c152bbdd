//! Message dispatcher - receives events and routes them through the resolver

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::routing::resolver::{resolve, Resolved};
use crate::domain::entities::{ChatEvent, EventCategory};
use crate::domain::traits::ChatClient;
use crate::plugins::registry::{HandlerContext, Registry};

/// Owns the event-receive loop: pulls classified events off the client,
/// resolves them against the registry and invokes every matching handler.
pub struct Dispatcher {
    registry: Arc<Registry>,
    client: Arc<dyn ChatClient>,
    /// Reply sent when nothing matched a respond-to event. Unset means
    /// silence.
    default_reply: Option<String>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        client: Arc<dyn ChatClient>,
        default_reply: Option<String>,
    ) -> Self {
        Self {
            registry,
            client,
            default_reply,
        }
    }

    /// Run the dispatch loop until the transport closes or `shutdown` is
    /// cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("dispatch loop started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("dispatch loop stopping");
                    break;
                }
                event = self.client.next_event() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => {
                        info!("transport closed, dispatch loop ending");
                        break;
                    }
                }
            }
        }
    }

    /// Route one event: fan out to every matching handler, or fall back
    /// to the default reply when the resolver yields the sentinel.
    pub async fn dispatch(&self, event: ChatEvent) {
        debug!("dispatching {} event: {}", event.category, event.text);

        for resolved in resolve(&self.registry, event.category, &event.text) {
            match resolved {
                Resolved::Match { name, handler, captures } => {
                    let ctx = HandlerContext {
                        event: event.clone(),
                        captures,
                    };
                    match handler(&ctx) {
                        Ok(Some(reply)) => self.send(&event.channel, &reply).await,
                        Ok(None) => {}
                        Err(e) => error!("handler \"{}\" failed: {}", name, e),
                    }
                }
                Resolved::NoMatch => {
                    if event.category == EventCategory::RespondTo {
                        if let Some(reply) = self.default_reply.clone() {
                            self.send(&event.channel, &reply).await;
                        }
                    }
                }
            }
        }
    }

    async fn send(&self, channel: &str, text: &str) {
        if let Err(e) = self.client.send_message(channel, text).await {
            error!("failed to send reply: {}", e);
        }
    }
}
