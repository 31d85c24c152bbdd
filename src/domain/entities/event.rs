use std::fmt;

/// Class of chat event that partitions handler registration.
///
/// This set is closed: adapters map whatever their platform produces onto
/// one of these categories before the event reaches the routing core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// A message addressed directly to the bot
    RespondTo,
    /// Any channel message the bot can observe
    ListenTo,
    PostEdited,
    PostDeleted,
    ReactionAdded,
    ReactionRemoved,
}

impl EventCategory {
    /// All categories, in a stable order.
    pub const ALL: [EventCategory; 6] = [
        EventCategory::RespondTo,
        EventCategory::ListenTo,
        EventCategory::PostEdited,
        EventCategory::PostDeleted,
        EventCategory::ReactionAdded,
        EventCategory::ReactionRemoved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::RespondTo => "respond_to",
            EventCategory::ListenTo => "listen_to",
            EventCategory::PostEdited => "post_edited",
            EventCategory::PostDeleted => "post_deleted",
            EventCategory::ReactionAdded => "reaction_added",
            EventCategory::ReactionRemoved => "reaction_removed",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming chat event, already classified by the transport adapter.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub category: EventCategory,
    pub channel: String,
    pub sender: Option<String>,
    /// Text payload the registered patterns are searched against. For
    /// reaction events this is the emoji name.
    pub text: String,
}

impl ChatEvent {
    pub fn new(category: EventCategory, channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category,
            channel: channel.into(),
            sender: None,
            text: text.into(),
        }
    }

    pub fn respond_to(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(EventCategory::RespondTo, channel, text)
    }

    pub fn listen_to(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(EventCategory::ListenTo, channel, text)
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_stable() {
        assert_eq!(EventCategory::RespondTo.as_str(), "respond_to");
        assert_eq!(EventCategory::ReactionRemoved.as_str(), "reaction_removed");
        assert_eq!(EventCategory::ALL.len(), 6);
    }

    #[test]
    fn builders_classify_events() {
        let event = ChatEvent::respond_to("chan", "hello").with_sender("alice");
        assert_eq!(event.category, EventCategory::RespondTo);
        assert_eq!(event.sender.as_deref(), Some("alice"));
    }
}
