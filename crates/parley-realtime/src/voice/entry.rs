//! A single voice channel participant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::types::{ChannelId, UserId};

use crate::connection::handle::ConnectionId;
use crate::message::types::VoiceStatePatch;

/// One user's seat in a voice channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceEntry {
    /// Voice channel.
    pub channel_id: ChannelId,
    /// Participant.
    pub user_id: UserId,
    /// Connection that owns the seat.
    #[serde(skip)]
    pub connection_id: ConnectionId,
    /// Microphone muted.
    pub muted: bool,
    /// Audio output deafened.
    pub deafened: bool,
    /// Currently speaking.
    pub speaking: bool,
    /// When the user took the seat.
    pub joined_at: DateTime<Utc>,
}

impl VoiceEntry {
    /// A fresh seat with all flags cleared.
    pub fn new(channel_id: ChannelId, user_id: UserId, connection_id: ConnectionId) -> Self {
        Self {
            channel_id,
            user_id,
            connection_id,
            muted: false,
            deafened: false,
            speaking: false,
            joined_at: Utc::now(),
        }
    }

    /// Applies a partial flag update.
    pub fn apply(&mut self, patch: VoiceStatePatch) {
        if let Some(muted) = patch.muted {
            self.muted = muted;
        }
        if let Some(deafened) = patch.deafened {
            self.deafened = deafened;
        }
        if let Some(speaking) = patch.speaking {
            self.speaking = speaking;
        }
    }
}
