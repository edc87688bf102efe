//! Message persistence. Only a bounded index of message ids is retained,
//! for reply lookups.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use parley_core::traits::MessageStore;
use parley_core::types::{Destination, MessageAuthor, MessageId, NewMessage, PersistedMessage};
use parley_core::{AppError, AppResult};

use super::store::{ChannelKind, MemoryDirectory};

#[async_trait]
impl MessageStore for MemoryDirectory {
    async fn persist(&self, message: NewMessage) -> AppResult<PersistedMessage> {
        let server_id = match message.destination {
            Destination::Channel(channel_id) => {
                let record = self
                    .channels
                    .get(&channel_id)
                    .map(|record| *record)
                    .ok_or_else(|| AppError::not_found("Channel not found"))?;
                if record.kind != ChannelKind::Text {
                    return Err(AppError::validation("Cannot post messages to a voice channel"));
                }
                Some(record.server_id)
            }
            Destination::Conversation(conversation_id) => {
                if !self.conversations.contains_key(&conversation_id) {
                    return Err(AppError::not_found("Conversation not found"));
                }
                None
            }
        };

        if let Some(reply_to) = message.reply_to {
            let same_destination = self
                .messages
                .get(&reply_to)
                .await
                .is_some_and(|destination| destination == message.destination);
            if !same_destination {
                return Err(AppError::validation("Replied-to message not found"));
            }
        }

        let persisted = PersistedMessage {
            id: MessageId::new(),
            destination: message.destination,
            server_id,
            author: MessageAuthor {
                id: message.author_id,
                username: self.username_of(message.author_id),
            },
            content: message.content,
            reply_to: message.reply_to,
            created_at: Utc::now(),
        };
        self.messages
            .insert(persisted.id, persisted.destination)
            .await;

        debug!(
            message_id = %persisted.id,
            destination = %persisted.destination,
            "Message persisted"
        );
        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use parley_core::error::ErrorKind;
    use parley_core::types::{ChannelId, ConversationId, OccupancyLimit, ServerId, UserId};

    use super::*;

    fn new_message(author_id: UserId, destination: Destination) -> NewMessage {
        NewMessage {
            author_id,
            destination,
            content: "hello".into(),
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn test_persist_populates_author_and_server() {
        let directory = MemoryDirectory::new();
        let server = ServerId::new();
        let channel = ChannelId::new();
        let alice = UserId::new();
        directory.add_user(alice, "alice");
        directory.add_channel(server, channel, ChannelKind::Text);

        let persisted = directory
            .persist(new_message(alice, Destination::Channel(channel)))
            .await
            .expect("persist");
        assert_eq!(persisted.author.username, "alice");
        assert_eq!(persisted.server_id, Some(server));
        assert_eq!(persisted.content, "hello");
    }

    #[tokio::test]
    async fn test_reply_must_exist_in_same_destination() {
        let directory = MemoryDirectory::new();
        let conversation = ConversationId::new();
        let other = ConversationId::new();
        let alice = UserId::new();
        directory.add_conversation(conversation, [alice]);
        directory.add_conversation(other, [alice]);

        let first = directory
            .persist(new_message(alice, Destination::Conversation(conversation)))
            .await
            .expect("persist");

        let mut reply = new_message(alice, Destination::Conversation(conversation));
        reply.reply_to = Some(first.id);
        assert!(directory.persist(reply).await.is_ok());

        let mut misplaced = new_message(alice, Destination::Conversation(other));
        misplaced.reply_to = Some(first.id);
        let err = directory.persist(misplaced).await.expect_err("rejected");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_message_index_is_bounded() {
        let directory = MemoryDirectory::with_message_capacity(4);
        let conversation = ConversationId::new();
        let alice = UserId::new();
        directory.add_conversation(conversation, [alice]);

        for _ in 0..32 {
            directory
                .persist(new_message(alice, Destination::Conversation(conversation)))
                .await
                .expect("persist");
        }
        directory.messages.run_pending_tasks().await;
        assert!(directory.messages.entry_count() <= 4);
    }

    #[tokio::test]
    async fn test_voice_channels_reject_messages() {
        let directory = MemoryDirectory::new();
        let channel = ChannelId::new();
        directory.add_channel(
            ServerId::new(),
            channel,
            ChannelKind::Voice(OccupancyLimit::Unlimited),
        );
        let err = directory
            .persist(new_message(UserId::new(), Destination::Channel(channel)))
            .await
            .expect_err("rejected");
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
