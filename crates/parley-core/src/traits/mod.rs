//! Collaborator traits consumed by the real-time layer.
//!
//! Durable state (users, servers, channels, messages) lives behind these
//! interfaces; the real-time crate never touches storage directly.

pub mod channel_directory;
pub mod identity;
pub mod membership;
pub mod message_store;

pub use channel_directory::ChannelDirectory;
pub use identity::{IdentityService, VerifiedIdentity};
pub use membership::MembershipService;
pub use message_store::MessageStore;
