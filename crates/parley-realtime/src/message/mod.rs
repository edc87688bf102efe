//! WebSocket wire messages: event types, serialization, validation.

pub mod builder;
pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{InboundEvent, OutboundMessage, VoiceStatePatch};
