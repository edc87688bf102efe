//! Shared domain types: typed ids, message destinations, and the payloads
//! exchanged with external collaborators.

pub mod destination;
pub mod id;
pub mod message;
pub mod voice;

pub use destination::Destination;
pub use id::{ChannelId, ConversationId, MessageId, ServerId, UserId};
pub use message::{MessageAuthor, NewMessage, PersistedMessage};
pub use voice::{OccupancyLimit, VoiceChannelInfo};
