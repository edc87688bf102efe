//! Membership and authorization checks.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{ChannelId, ConversationId, ServerId, UserId};

/// Answers "may this user observe that room" questions.
///
/// Every room subscription is gated on one of these calls.
#[async_trait]
pub trait MembershipService: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the user is a member of the server.
    async fn is_server_member(&self, user_id: UserId, server_id: ServerId) -> AppResult<bool>;

    /// Whether the user can read the channel. Implies membership of the
    /// channel's parent server.
    async fn is_channel_accessible(&self, user_id: UserId, channel_id: ChannelId)
    -> AppResult<bool>;

    /// Whether the user participates in the conversation.
    async fn is_conversation_participant(
        &self,
        user_id: UserId,
        conversation_id: ConversationId,
    ) -> AppResult<bool>;

    /// Servers the user belongs to. Used to subscribe a freshly
    /// authenticated connection to its server rooms.
    async fn server_ids_for(&self, user_id: UserId) -> AppResult<Vec<ServerId>>;
}
