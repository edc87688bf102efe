//! Voice channel metadata supplied by the channel directory.

use serde::{Deserialize, Serialize};

use super::id::{ChannelId, ServerId};

/// Capacity and ownership of a voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceChannelInfo {
    /// Voice channel ID.
    pub channel_id: ChannelId,
    /// Server the channel belongs to.
    pub server_id: ServerId,
    /// Maximum simultaneous occupants.
    pub user_limit: OccupancyLimit,
}

/// Resolved occupancy limit for a voice channel.
///
/// Stored as a plain number by the channel directory, where `0` means
/// unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum OccupancyLimit {
    /// A fixed maximum number of occupants.
    Fixed(u32),
    /// No limit.
    Unlimited,
}

impl OccupancyLimit {
    /// Whether a channel with `occupied` entries can accept no further joins.
    pub fn is_full(&self, occupied: usize) -> bool {
        match self {
            Self::Fixed(max) => occupied >= *max as usize,
            Self::Unlimited => false,
        }
    }
}

impl From<u32> for OccupancyLimit {
    /// `0` means unlimited.
    fn from(value: u32) -> Self {
        if value == 0 {
            Self::Unlimited
        } else {
            Self::Fixed(value)
        }
    }
}

impl From<OccupancyLimit> for u32 {
    fn from(limit: OccupancyLimit) -> u32 {
        match limit {
            OccupancyLimit::Fixed(max) => max,
            OccupancyLimit::Unlimited => 0,
        }
    }
}
