//! Where a message, typing indicator, or reaction lives.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

use super::id::{ChannelId, ConversationId};

/// A server text channel or a direct-message conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Destination {
    /// A channel inside a server.
    Channel(ChannelId),
    /// A direct-message conversation.
    Conversation(ConversationId),
}

impl Destination {
    /// Builds a destination from the optional `channel_id` /
    /// `conversation_id` pair carried by client payloads.
    ///
    /// Exactly one of the two must be present.
    pub fn from_parts(
        channel_id: Option<ChannelId>,
        conversation_id: Option<ConversationId>,
    ) -> AppResult<Self> {
        match (channel_id, conversation_id) {
            (Some(channel), None) => Ok(Self::Channel(channel)),
            (None, Some(conversation)) => Ok(Self::Conversation(conversation)),
            (Some(_), Some(_)) => Err(AppError::validation(
                "Provide either channel_id or conversation_id, not both",
            )),
            (None, None) => Err(AppError::validation(
                "Missing channel_id or conversation_id",
            )),
        }
    }

    /// Returns the channel id if this is a server channel.
    pub fn channel_id(&self) -> Option<ChannelId> {
        match self {
            Self::Channel(id) => Some(*id),
            Self::Conversation(_) => None,
        }
    }

    /// Returns the conversation id if this is a DM conversation.
    pub fn conversation_id(&self) -> Option<ConversationId> {
        match self {
            Self::Conversation(id) => Some(*id),
            Self::Channel(_) => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(id) => write!(f, "channel:{id}"),
            Self::Conversation(id) => write!(f, "dm:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_requires_exactly_one() {
        let channel = ChannelId::new();
        let conversation = ConversationId::new();

        assert_eq!(
            Destination::from_parts(Some(channel), None).unwrap(),
            Destination::Channel(channel)
        );
        assert_eq!(
            Destination::from_parts(None, Some(conversation)).unwrap(),
            Destination::Conversation(conversation)
        );
        assert!(Destination::from_parts(Some(channel), Some(conversation)).is_err());
        assert!(Destination::from_parts(None, None).is_err());
    }
}
