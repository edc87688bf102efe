//! WebSocket connection lifecycle: handles, pool, registry, heartbeat.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;

pub use handle::{ConnectionHandle, ConnectionId, ConnectionState};
pub use manager::ConnectionManager;
