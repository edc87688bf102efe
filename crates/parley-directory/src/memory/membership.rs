//! Membership checks.

use async_trait::async_trait;

use parley_core::AppResult;
use parley_core::traits::MembershipService;
use parley_core::types::{ChannelId, ConversationId, ServerId, UserId};

use super::store::MemoryDirectory;

#[async_trait]
impl MembershipService for MemoryDirectory {
    async fn is_server_member(&self, user_id: UserId, server_id: ServerId) -> AppResult<bool> {
        Ok(self.is_member(user_id, server_id))
    }

    async fn is_channel_accessible(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> AppResult<bool> {
        let server_id = self.channels.get(&channel_id).map(|c| c.server_id);
        Ok(server_id.is_some_and(|server_id| self.is_member(user_id, server_id)))
    }

    async fn is_conversation_participant(
        &self,
        user_id: UserId,
        conversation_id: ConversationId,
    ) -> AppResult<bool> {
        Ok(self
            .conversations
            .get(&conversation_id)
            .is_some_and(|participants| participants.contains(&user_id)))
    }

    async fn server_ids_for(&self, user_id: UserId) -> AppResult<Vec<ServerId>> {
        Ok(self
            .server_members
            .iter()
            .filter(|entry| entry.value().contains(&user_id))
            .map(|entry| *entry.key())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ChannelKind;

    #[tokio::test]
    async fn test_channel_access_follows_server_membership() {
        let directory = MemoryDirectory::new();
        let server = ServerId::new();
        let channel = ChannelId::new();
        let member = UserId::new();
        let outsider = UserId::new();
        directory.add_server(server, [member]);
        directory.add_channel(server, channel, ChannelKind::Text);

        assert!(directory.is_channel_accessible(member, channel).await.unwrap());
        assert!(!directory.is_channel_accessible(outsider, channel).await.unwrap());
        assert!(
            !directory
                .is_channel_accessible(member, ChannelId::new())
                .await
                .unwrap()
        );
        assert_eq!(directory.server_ids_for(member).await.unwrap(), vec![server]);
        assert!(directory.server_ids_for(outsider).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conversation_participants() {
        let directory = MemoryDirectory::new();
        let conversation = ConversationId::new();
        let alice = UserId::new();
        let bob = UserId::new();
        directory.add_conversation(conversation, [alice]);

        assert!(
            directory
                .is_conversation_participant(alice, conversation)
                .await
                .unwrap()
        );
        assert!(
            !directory
                .is_conversation_participant(bob, conversation)
                .await
                .unwrap()
        );
    }
}
