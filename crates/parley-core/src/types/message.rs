//! Message payloads exchanged with the message persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::destination::Destination;
use super::id::{MessageId, ServerId, UserId};

/// A validated message about to be handed to the message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    /// Authenticated author.
    pub author_id: UserId,
    /// Channel or conversation the message is posted to.
    pub destination: Destination,
    /// Message body.
    pub content: String,
    /// Message this one replies to.
    pub reply_to: Option<MessageId>,
}

/// Author details populated by the message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
}

/// A message as returned by the message store after persistence.
///
/// The router forwards exactly this representation to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMessage {
    /// Message ID.
    pub id: MessageId,
    /// Channel or conversation the message belongs to.
    pub destination: Destination,
    /// Parent server, for channel messages.
    pub server_id: Option<ServerId>,
    /// Author.
    pub author: MessageAuthor,
    /// Message body.
    pub content: String,
    /// Message this one replies to.
    pub reply_to: Option<MessageId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
