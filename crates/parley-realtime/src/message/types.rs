//! Inbound and outbound WebSocket event type definitions.
//!
//! Every frame is a JSON object whose `type` field names the event.
//! Targets that may be either a channel or a DM conversation carry
//! `channel_id` or `conversation_id`; exactly one must be present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::types::{
    ChannelId, ConversationId, Destination, MessageId, PersistedMessage, ServerId, UserId,
};

use crate::presence::status::PresenceStatus;
use crate::room::types::{RoomId, RoomKind};
use crate::voice::entry::VoiceEntry;

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Present a bearer token.
    Authenticate {
        /// Opaque token verified by the identity service.
        token: String,
    },
    /// Subscribe to a room.
    JoinRoom {
        /// Room kind.
        room_kind: RoomKind,
        /// Server, channel, or conversation id.
        room_id: Uuid,
    },
    /// Unsubscribe from a room.
    LeaveRoom {
        /// Room kind.
        room_kind: RoomKind,
        /// Server, channel, or conversation id.
        room_id: Uuid,
    },
    /// Post a message to a channel or conversation.
    SendMessage {
        /// Target text channel.
        #[serde(default)]
        channel_id: Option<ChannelId>,
        /// Target DM conversation.
        #[serde(default)]
        conversation_id: Option<ConversationId>,
        /// Message body.
        content: String,
        /// Message being replied to.
        #[serde(default)]
        reply_to: Option<MessageId>,
    },
    /// The user started typing.
    TypingStart {
        /// Target text channel.
        #[serde(default)]
        channel_id: Option<ChannelId>,
        /// Target DM conversation.
        #[serde(default)]
        conversation_id: Option<ConversationId>,
    },
    /// The user stopped typing.
    TypingStop {
        /// Target text channel.
        #[serde(default)]
        channel_id: Option<ChannelId>,
        /// Target DM conversation.
        #[serde(default)]
        conversation_id: Option<ConversationId>,
    },
    /// Set an explicit presence status.
    StatusChange {
        /// One of `online`, `idle`, `dnd`, `invisible`.
        status: String,
        /// Free-form status text.
        #[serde(default)]
        custom_status: Option<String>,
    },
    /// Take a seat in a voice channel.
    JoinVoice {
        /// Voice channel.
        channel_id: ChannelId,
    },
    /// Give up a voice seat.
    LeaveVoice {
        /// Voice channel.
        channel_id: ChannelId,
    },
    /// Update mute/deafen/speaking flags.
    VoiceStateChange {
        /// Voice channel.
        channel_id: ChannelId,
        /// Flags to change; absent flags keep their value.
        #[serde(flatten)]
        patch: VoiceStatePatch,
    },
    /// React to a message.
    AddReaction {
        /// Reacted message.
        message_id: MessageId,
        /// Emoji identifier.
        emoji: String,
        /// Channel of the message.
        #[serde(default)]
        channel_id: Option<ChannelId>,
        /// Conversation of the message.
        #[serde(default)]
        conversation_id: Option<ConversationId>,
    },
    /// Remove a reaction.
    RemoveReaction {
        /// Reacted message.
        message_id: MessageId,
        /// Emoji identifier.
        emoji: String,
        /// Channel of the message.
        #[serde(default)]
        channel_id: Option<ChannelId>,
        /// Conversation of the message.
        #[serde(default)]
        conversation_id: Option<ConversationId>,
    },
    /// Heartbeat reply.
    Pong {
        /// Echoed timestamp.
        #[serde(default)]
        timestamp: Option<i64>,
    },
    /// Any event type this server does not know.
    #[serde(other)]
    Unknown,
}

/// Partial update of a voice participant's flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStatePatch {
    /// Microphone muted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    /// Audio output deafened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deafened: Option<bool>,
    /// Currently speaking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking: Option<bool>,
}

impl VoiceStatePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.muted.is_none() && self.deafened.is_none() && self.speaking.is_none()
    }
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// The connection is now bound to a user.
    Authenticated {
        /// Authenticated user.
        user_id: UserId,
        /// Display name, when the identity service provides one.
        username: Option<String>,
    },
    /// Authentication was rejected; the connection stays open.
    AuthError {
        /// Reason.
        message: String,
    },
    /// Acknowledges a room subscription.
    RoomJoined {
        /// Joined room.
        room: RoomId,
    },
    /// Acknowledges a room unsubscription.
    RoomLeft {
        /// Left room.
        room: RoomId,
    },
    /// A message was persisted.
    NewMessage {
        /// The persisted message.
        message: PersistedMessage,
    },
    /// A user started typing.
    UserTyping {
        /// Where the user is typing.
        destination: Destination,
        /// Typing user.
        user_id: UserId,
        /// Display name.
        username: Option<String>,
        /// When typing started.
        started_at: DateTime<Utc>,
    },
    /// A user stopped typing, explicitly or by expiry.
    UserStoppedTyping {
        /// Where the user was typing.
        destination: Destination,
        /// User who stopped.
        user_id: UserId,
    },
    /// A user's visible presence changed.
    UserStatusChange {
        /// User.
        user_id: UserId,
        /// Display name.
        username: Option<String>,
        /// Visible status; invisible users are reported as offline.
        status: PresenceStatus,
        /// Custom status text.
        custom_status: Option<String>,
        /// Last time the user was seen connected.
        last_seen: DateTime<Utc>,
    },
    /// Acknowledges a voice join with the channel's current occupants.
    VoiceJoined {
        /// Voice channel.
        channel_id: ChannelId,
        /// The caller's own entry.
        entry: VoiceEntry,
        /// Everyone in the channel, including the caller.
        occupants: Vec<VoiceEntry>,
    },
    /// Someone took a seat in the voice channel.
    UserJoinedVoice {
        /// Voice channel.
        channel_id: ChannelId,
        /// Display name.
        username: Option<String>,
        /// New participant.
        entry: VoiceEntry,
    },
    /// Someone left the voice channel.
    UserLeftVoice {
        /// Voice channel.
        channel_id: ChannelId,
        /// Departed user.
        user_id: UserId,
    },
    /// Voice occupancy summary for server-wide sidebars.
    VoiceOccupancyChanged {
        /// Voice channel.
        channel_id: ChannelId,
        /// Parent server.
        server_id: ServerId,
        /// Users currently in the channel.
        connected_users: usize,
    },
    /// A voice participant's flags changed.
    UserVoiceStateChange {
        /// Voice channel.
        channel_id: ChannelId,
        /// Participant.
        user_id: UserId,
        /// Microphone muted.
        muted: bool,
        /// Audio output deafened.
        deafened: bool,
        /// Currently speaking.
        speaking: bool,
    },
    /// A reaction was added to a message.
    ReactionAdded {
        /// Where the message lives.
        destination: Destination,
        /// Reacted message.
        message_id: MessageId,
        /// Reacting user.
        user_id: UserId,
        /// Emoji identifier.
        emoji: String,
    },
    /// A reaction was removed from a message.
    ReactionRemoved {
        /// Where the message lives.
        destination: Destination,
        /// Reacted message.
        message_id: MessageId,
        /// User whose reaction was removed.
        user_id: UserId,
        /// Emoji identifier.
        emoji: String,
    },
    /// Heartbeat probe.
    Ping {
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// A rejected action. Only ever sent to the acting connection.
    Error {
        /// Error category code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl OutboundMessage {
    /// The wire `type` of this message.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::AuthError { .. } => "auth_error",
            Self::RoomJoined { .. } => "room_joined",
            Self::RoomLeft { .. } => "room_left",
            Self::NewMessage { .. } => "new_message",
            Self::UserTyping { .. } => "user_typing",
            Self::UserStoppedTyping { .. } => "user_stopped_typing",
            Self::UserStatusChange { .. } => "user_status_change",
            Self::VoiceJoined { .. } => "voice_joined",
            Self::UserJoinedVoice { .. } => "user_joined_voice",
            Self::UserLeftVoice { .. } => "user_left_voice",
            Self::VoiceOccupancyChanged { .. } => "voice_occupancy_changed",
            Self::UserVoiceStateChange { .. } => "user_voice_state_change",
            Self::ReactionAdded { .. } => "reaction_added",
            Self::ReactionRemoved { .. } => "reaction_removed",
            Self::Ping { .. } => "ping",
            Self::Error { .. } => "error",
        }
    }
}
