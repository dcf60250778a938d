//! Conversational events that drive a turn.

use chat_state::SessionState;
use serde::{Deserialize, Serialize};

/// Something that happened in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A new session was opened.
    SessionStarted,

    /// The user sent a message.
    UserMessage { text: String },

    /// The character replied.
    AssistantReply { text: String },

    /// The user bought an item.
    Purchase { sku: String },

    /// The user finished an episode.
    EpisodeCleared { episode: u32 },

    /// The user reached an ending.
    EndingReached { ending_key: String },
}

/// Event discriminant, used to scope trigger rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionStarted,
    UserMessage,
    AssistantReply,
    Purchase,
    EpisodeCleared,
    EndingReached,
}

impl ChatEvent {
    pub fn user_message(text: impl Into<String>) -> Self {
        ChatEvent::UserMessage { text: text.into() }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ChatEvent::SessionStarted => EventKind::SessionStarted,
            ChatEvent::UserMessage { .. } => EventKind::UserMessage,
            ChatEvent::AssistantReply { .. } => EventKind::AssistantReply,
            ChatEvent::Purchase { .. } => EventKind::Purchase,
            ChatEvent::EpisodeCleared { .. } => EventKind::EpisodeCleared,
            ChatEvent::EndingReached { .. } => EventKind::EndingReached,
        }
    }

    /// Message text, for message events.
    pub fn text(&self) -> Option<&str> {
        match self {
            ChatEvent::UserMessage { text } | ChatEvent::AssistantReply { text } => Some(text),
            _ => None,
        }
    }

    /// Record the direct state change this event carries, outside of any
    /// trigger rule. Returns whether the state changed.
    pub fn apply_to(&self, state: &mut SessionState) -> bool {
        match self {
            ChatEvent::Purchase { sku } => state.add_owned_item(sku.clone()),
            ChatEvent::EpisodeCleared { episode } => state.ending_mut().clear_episode(*episode),
            ChatEvent::EndingReached { ending_key } => state.ending_mut().unlock(ending_key.clone()),
            ChatEvent::SessionStarted
            | ChatEvent::UserMessage { .. }
            | ChatEvent::AssistantReply { .. } => false,
        }
    }
}
