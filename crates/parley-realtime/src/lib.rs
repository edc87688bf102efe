//! # parley-realtime
//!
//! Real-time presence and message-fanout engine for Parley. Provides:
//!
//! - Connection registry with token authentication and per-user caps
//! - Room membership index (server, channel, voice, and DM rooms)
//! - User presence tracking (online/idle/dnd/invisible/offline)
//! - Self-expiring typing indicators
//! - Voice channel occupancy with capacity enforcement
//! - An event router that authorizes, dispatches, and fans out events

pub mod connection;
pub mod fanout;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod room;
pub mod router;
pub mod server;
pub mod typing;
pub mod voice;

pub use connection::manager::ConnectionManager;
pub use fanout::Fanout;
pub use presence::tracker::PresenceTracker;
pub use room::registry::RoomRegistry;
pub use router::EventRouter;
pub use server::{Collaborators, RealtimeEngine};
pub use typing::TypingManager;
pub use voice::VoiceManager;
