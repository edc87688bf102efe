//! Room identifiers and parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::types::{ChannelId, ConversationId, Destination, ServerId};

/// The kind of a room, without its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Every member of a server.
    Server,
    /// A text channel.
    Channel,
    /// A voice channel's observers and participants.
    Voice,
    /// A direct-message conversation.
    Dm,
}

/// Typed room identifiers. A room is a named fanout group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RoomId {
    /// Server-wide room (presence, voice occupancy).
    Server(ServerId),
    /// Text channel room (messages, typing, reactions).
    Channel(ChannelId),
    /// Voice channel room (participant state).
    Voice(ChannelId),
    /// Direct-message conversation room.
    Dm(ConversationId),
}

impl RoomId {
    /// Builds a room id from a kind and a raw identifier.
    pub fn new(kind: RoomKind, id: Uuid) -> Self {
        match kind {
            RoomKind::Server => Self::Server(ServerId::from_uuid(id)),
            RoomKind::Channel => Self::Channel(ChannelId::from_uuid(id)),
            RoomKind::Voice => Self::Voice(ChannelId::from_uuid(id)),
            RoomKind::Dm => Self::Dm(ConversationId::from_uuid(id)),
        }
    }

    /// The room's kind.
    pub fn kind(&self) -> RoomKind {
        match self {
            Self::Server(_) => RoomKind::Server,
            Self::Channel(_) => RoomKind::Channel,
            Self::Voice(_) => RoomKind::Voice,
            Self::Dm(_) => RoomKind::Dm,
        }
    }
}

impl From<Destination> for RoomId {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Channel(id) => Self::Channel(id),
            Destination::Conversation(id) => Self::Dm(id),
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "server:{id}"),
            Self::Channel(id) => write!(f, "channel:{id}"),
            Self::Voice(id) => write!(f, "voice:{id}"),
            Self::Dm(id) => write!(f, "dm:{id}"),
        }
    }
}
