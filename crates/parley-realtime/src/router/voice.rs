//! Voice occupancy events.

use parley_core::AppResult;
use parley_core::error::ErrorKind;
use parley_core::traits::VerifiedIdentity;
use parley_core::types::{ChannelId, UserId};

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::{OutboundMessage, VoiceStatePatch};
use crate::room::types::RoomId;
use crate::voice::VoiceLeave;

use super::EventRouter;

impl EventRouter {
    pub(super) async fn join_voice(
        &self,
        handle: &ConnectionHandle,
        identity: &VerifiedIdentity,
        channel_id: ChannelId,
    ) -> AppResult<()> {
        let room = RoomId::Voice(channel_id);
        self.authorize_room(identity.user_id, room).await?;
        let info = self.channels.voice_channel(channel_id).await?;
        self.ensure_subscription_capacity(handle.id, &room)?;

        let join = self
            .voice
            .join(info, identity.user_id, handle.id)
            .inspect_err(|err| {
                if err.kind == ErrorKind::Capacity {
                    self.metrics.voice_capacity_rejected();
                }
            })?;

        // Capacity was checked before the seat was taken.
        if self.rooms.join(handle.id, room) {
            self.metrics.subscribed();
        }

        handle.send(OutboundMessage::VoiceJoined {
            channel_id,
            entry: join.entry.clone(),
            occupants: join.occupants.clone(),
        });

        if join.newly_joined {
            self.fanout.to_room(
                &room,
                &OutboundMessage::UserJoinedVoice {
                    channel_id,
                    username: identity.username.clone(),
                    entry: join.entry.clone(),
                },
                Some(handle.id),
            );
            self.fanout.to_room(
                &RoomId::Server(join.server_id),
                &OutboundMessage::VoiceOccupancyChanged {
                    channel_id,
                    server_id: join.server_id,
                    connected_users: join.connected_users(),
                },
                None,
            );
        }
        Ok(())
    }

    pub(super) fn leave_voice(&self, handle: &ConnectionHandle, user_id: UserId, channel_id: ChannelId) {
        if let Some(leave) = self.voice.leave(channel_id, user_id) {
            self.emit_voice_left(handle.id, &leave);
        }
        self.rooms.leave(handle.id, &RoomId::Voice(channel_id));
    }

    pub(super) fn voice_state_change(
        &self,
        handle: &ConnectionHandle,
        user_id: UserId,
        channel_id: ChannelId,
        patch: VoiceStatePatch,
    ) {
        if patch.is_empty() {
            return;
        }
        if let Some(entry) = self.voice.update_state(channel_id, user_id, patch) {
            self.fanout.to_room(
                &RoomId::Voice(channel_id),
                &OutboundMessage::UserVoiceStateChange {
                    channel_id,
                    user_id,
                    muted: entry.muted,
                    deafened: entry.deafened,
                    speaking: entry.speaking,
                },
                Some(handle.id),
            );
        }
    }

    /// Announces a departure to the voice room and the new count to the
    /// parent server room.
    pub(super) fn emit_voice_left(&self, actor: ConnectionId, leave: &VoiceLeave) {
        let channel_id = leave.entry.channel_id;
        self.fanout.to_room(
            &RoomId::Voice(channel_id),
            &OutboundMessage::UserLeftVoice {
                channel_id,
                user_id: leave.entry.user_id,
            },
            Some(actor),
        );
        self.fanout.to_room(
            &RoomId::Server(leave.server_id),
            &OutboundMessage::VoiceOccupancyChanged {
                channel_id,
                server_id: leave.server_id,
                connected_users: leave.connected_users,
            },
            None,
        );
    }
}
