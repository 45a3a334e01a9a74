//! Chat transcript
//!
//! Append-only list of finalized messages plus a single live slot that shows
//! either the thinking indicator or the growing assistant answer.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Where a user message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    Typed,
    MainTopic,
    SubTopic,
    /// Assistant output
    Reply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub source: MessageSource,
}

/// Contents of the in-progress slot below the last message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LiveSlot {
    #[default]
    Empty,
    Thinking,
    Streaming(String),
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    live: LiveSlot,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn live(&self) -> &LiveSlot {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push_user(&mut self, content: impl Into<String>, source: MessageSource) -> &Message {
        self.push(Role::User, content.into(), source)
    }

    /// Append a finalized assistant message; the live slot is cleared
    pub fn push_assistant(&mut self, content: impl Into<String>) -> &Message {
        self.live = LiveSlot::Empty;
        self.push(Role::Assistant, content.into(), MessageSource::Reply)
    }

    pub fn show_thinking(&mut self) {
        self.live = LiveSlot::Thinking;
    }

    /// Replace the live message content with the latest accumulated text
    pub fn update_live(&mut self, content: impl Into<String>) {
        self.live = LiveSlot::Streaming(content.into());
    }

    pub fn clear_live(&mut self) {
        self.live = LiveSlot::Empty;
    }

    fn push(&mut self, role: Role, content: String, source: MessageSource) -> &Message {
        self.messages.push(Message {
            id: MessageId::new(),
            role,
            content,
            source,
        });
        let last = self.messages.len() - 1;
        &self.messages[last]
    }
}
