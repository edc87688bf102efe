//! Channel metadata used for routing decisions.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{ChannelId, VoiceChannelInfo};

/// Supplies voice channel capacity and ownership.
#[async_trait]
pub trait ChannelDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Voice channel metadata. Fails with `NotFound` for unknown channels
    /// and `Validation` for channels that are not voice channels.
    async fn voice_channel(&self, channel_id: ChannelId) -> AppResult<VoiceChannelInfo>;
}
