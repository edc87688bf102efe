//! Voice channel occupancy: who is in which voice channel, with capacity
//! enforcement. No media is handled here.

pub mod entry;
pub mod manager;

pub use entry::VoiceEntry;
pub use manager::{VoiceJoin, VoiceLeave, VoiceManager};
