//! In-memory directory backed by concurrent maps.

mod channels;
mod membership;
mod messages;
mod store;

pub use store::{ChannelKind, MemoryDirectory};
