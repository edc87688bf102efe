//! Room membership index: which connections are subscribed to which rooms.

pub mod registry;
pub mod room;
pub mod subscription;
pub mod types;

pub use registry::RoomRegistry;
pub use types::{RoomId, RoomKind};
