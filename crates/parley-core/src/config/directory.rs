//! Seed data for the in-process directory.
//!
//! Single-node deployments without an external document store describe
//! their users, servers, channels and conversations here.

use serde::{Deserialize, Serialize};

use crate::types::{ChannelId, ConversationId, ServerId, UserId};

/// Directory seed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Maximum message ids kept for reply lookups.
    #[serde(default = "default_message_index_capacity")]
    pub message_index_capacity: u64,
    /// Known users.
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Servers with their members and channels.
    #[serde(default)]
    pub servers: Vec<SeedServer>,
    /// Direct-message conversations.
    #[serde(default)]
    pub conversations: Vec<SeedConversation>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            message_index_capacity: default_message_index_capacity(),
            users: Vec::new(),
            servers: Vec::new(),
            conversations: Vec::new(),
        }
    }
}

fn default_message_index_capacity() -> u64 {
    100_000
}

/// A user with a display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
}

/// A server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedServer {
    /// Server ID.
    pub id: ServerId,
    /// Member user IDs.
    #[serde(default)]
    pub members: Vec<UserId>,
    /// Channels.
    #[serde(default)]
    pub channels: Vec<SeedChannel>,
}

/// A channel inside a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedChannel {
    /// Channel ID.
    pub id: ChannelId,
    /// Text or voice.
    #[serde(default)]
    pub kind: SeedChannelKind,
    /// Voice capacity (0 = unlimited). Ignored for text channels.
    #[serde(default)]
    pub user_limit: u32,
}

/// Channel kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedChannelKind {
    /// Text channel.
    #[default]
    Text,
    /// Voice channel.
    Voice,
}

/// A direct-message conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConversation {
    /// Conversation ID.
    pub id: ConversationId,
    /// Participant user IDs.
    pub participants: Vec<UserId>,
}
