//! A single typing indicator.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::connection::handle::ConnectionId;

/// An active "user is typing" signal for one destination.
#[derive(Debug, Clone)]
pub struct TypingIndicator {
    /// Connection that started (or last refreshed) the indicator.
    pub connection_id: ConnectionId,
    /// When typing started or was last refreshed.
    pub started_at: DateTime<Utc>,
    /// Distinguishes this arming from earlier ones for the same key.
    pub generation: u64,
    /// Cancels the pending expiry timer.
    pub cancel: CancellationToken,
}
