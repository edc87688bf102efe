//! Channel metadata.

use async_trait::async_trait;

use parley_core::traits::ChannelDirectory;
use parley_core::types::{ChannelId, VoiceChannelInfo};
use parley_core::{AppError, AppResult};

use super::store::{ChannelKind, MemoryDirectory};

#[async_trait]
impl ChannelDirectory for MemoryDirectory {
    async fn voice_channel(&self, channel_id: ChannelId) -> AppResult<VoiceChannelInfo> {
        let record = self
            .channels
            .get(&channel_id)
            .map(|record| *record)
            .ok_or_else(|| AppError::not_found("Channel not found"))?;

        match record.kind {
            ChannelKind::Voice(user_limit) => Ok(VoiceChannelInfo {
                channel_id,
                server_id: record.server_id,
                user_limit,
            }),
            ChannelKind::Text => Err(AppError::validation("Not a voice channel")),
        }
    }
}
