//! Directory state and seeding.

use std::collections::HashSet;

use dashmap::DashMap;
use moka::future::Cache;
use tracing::info;

use parley_core::config::directory::{DirectoryConfig, SeedChannelKind};
use parley_core::types::{
    ChannelId, ConversationId, Destination, MessageId, OccupancyLimit, ServerId, UserId,
};

/// Channel kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Text channel.
    Text,
    /// Voice channel with a capacity.
    Voice(OccupancyLimit),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ChannelRecord {
    pub(crate) server_id: ServerId,
    pub(crate) kind: ChannelKind,
}

/// In-memory users, servers, channels, conversations, and message ids.
///
/// The message index is bounded; once full, older ids are evicted and
/// replies to them are rejected as unknown.
#[derive(Debug)]
pub struct MemoryDirectory {
    pub(crate) usernames: DashMap<UserId, String>,
    pub(crate) server_members: DashMap<ServerId, HashSet<UserId>>,
    pub(crate) channels: DashMap<ChannelId, ChannelRecord>,
    pub(crate) conversations: DashMap<ConversationId, HashSet<UserId>>,
    pub(crate) messages: Cache<MessageId, Destination>,
}

impl MemoryDirectory {
    /// Create an empty directory with the default message index capacity.
    pub fn new() -> Self {
        Self::with_message_capacity(DirectoryConfig::default().message_index_capacity)
    }

    /// Create an empty directory keeping at most `capacity` message ids.
    pub fn with_message_capacity(capacity: u64) -> Self {
        Self {
            usernames: DashMap::new(),
            server_members: DashMap::new(),
            channels: DashMap::new(),
            conversations: DashMap::new(),
            messages: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Create a directory from seed configuration.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let directory = Self::with_message_capacity(config.message_index_capacity);

        for user in &config.users {
            directory.add_user(user.id, user.username.clone());
        }
        for server in &config.servers {
            directory.add_server(server.id, server.members.iter().copied());
            for channel in &server.channels {
                let kind = match channel.kind {
                    SeedChannelKind::Text => ChannelKind::Text,
                    SeedChannelKind::Voice => {
                        ChannelKind::Voice(OccupancyLimit::from(channel.user_limit))
                    }
                };
                directory.add_channel(server.id, channel.id, kind);
            }
        }
        for conversation in &config.conversations {
            directory.add_conversation(conversation.id, conversation.participants.iter().copied());
        }

        info!(
            users = directory.usernames.len(),
            servers = directory.server_members.len(),
            channels = directory.channels.len(),
            conversations = directory.conversations.len(),
            "Directory seeded"
        );
        directory
    }

    /// Register a display name.
    pub fn add_user(&self, user_id: UserId, username: impl Into<String>) {
        self.usernames.insert(user_id, username.into());
    }

    /// Create a server or add members to an existing one.
    pub fn add_server(&self, server_id: ServerId, members: impl IntoIterator<Item = UserId>) {
        self.server_members
            .entry(server_id)
            .or_default()
            .extend(members);
    }

    /// Add a member to a server.
    pub fn add_member(&self, server_id: ServerId, user_id: UserId) {
        self.add_server(server_id, [user_id]);
    }

    /// Remove a member from a server.
    pub fn remove_member(&self, server_id: ServerId, user_id: UserId) -> bool {
        self.server_members
            .get_mut(&server_id)
            .is_some_and(|mut members| members.remove(&user_id))
    }

    /// Add a channel to a server.
    pub fn add_channel(&self, server_id: ServerId, channel_id: ChannelId, kind: ChannelKind) {
        self.server_members.entry(server_id).or_default();
        self.channels
            .insert(channel_id, ChannelRecord { server_id, kind });
    }

    /// Create a conversation.
    pub fn add_conversation(
        &self,
        conversation_id: ConversationId,
        participants: impl IntoIterator<Item = UserId>,
    ) {
        self.conversations
            .insert(conversation_id, participants.into_iter().collect());
    }

    pub(crate) fn username_of(&self, user_id: UserId) -> String {
        self.usernames
            .get(&user_id)
            .map(|name| name.value().clone())
            .unwrap_or_else(|| user_id.to_string())
    }

    pub(crate) fn is_member(&self, user_id: UserId, server_id: ServerId) -> bool {
        self.server_members
            .get(&server_id)
            .is_some_and(|members| members.contains(&user_id))
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use parley_core::config::AppConfig;

    use super::*;

    #[test]
    fn test_seed_from_toml() {
        let server = ServerId::new();
        let text = ChannelId::new();
        let voice = ChannelId::new();
        let alice = UserId::new();
        let toml = format!(
            r#"
            [[directory.users]]
            id = "{alice}"
            username = "alice"

            [[directory.servers]]
            id = "{server}"
            members = ["{alice}"]

            [[directory.servers.channels]]
            id = "{text}"

            [[directory.servers.channels]]
            id = "{voice}"
            kind = "voice"
            user_limit = 2
            "#
        );
        let config = AppConfig::from_toml(&toml).expect("parse");
        let directory = MemoryDirectory::from_config(&config.directory);

        assert!(directory.is_member(alice, server));
        assert_eq!(directory.username_of(alice), "alice");
        assert_eq!(
            directory.channels.get(&text).map(|c| c.kind),
            Some(ChannelKind::Text)
        );
        assert_eq!(
            directory.channels.get(&voice).map(|c| c.kind),
            Some(ChannelKind::Voice(OccupancyLimit::Fixed(2)))
        );
    }

    #[test]
    fn test_remove_member() {
        let directory = MemoryDirectory::new();
        let server = ServerId::new();
        let user = UserId::new();
        directory.add_member(server, user);
        assert!(directory.remove_member(server, user));
        assert!(!directory.is_member(user, server));
    }
}
