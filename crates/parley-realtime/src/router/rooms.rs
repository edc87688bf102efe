//! Room subscription events and access checks.

use tracing::{debug, warn};

use parley_core::types::UserId;
use parley_core::{AppError, AppResult};

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::OutboundMessage;
use crate::room::types::RoomId;

use super::EventRouter;
use super::errors::access_check_failed;

impl EventRouter {
    /// Subscribes a connection to a room after checking access.
    pub(super) async fn join_room(
        &self,
        handle: &ConnectionHandle,
        user_id: UserId,
        room: RoomId,
    ) -> AppResult<()> {
        self.authorize_room(user_id, room).await?;
        self.subscribe(handle.id, room)?;
        handle.send(OutboundMessage::RoomJoined { room });
        Ok(())
    }

    /// Fails when a new subscription would exceed the per-connection cap.
    pub(super) fn ensure_subscription_capacity(
        &self,
        conn_id: ConnectionId,
        room: &RoomId,
    ) -> AppResult<()> {
        if self.rooms.is_member(conn_id, room) {
            return Ok(());
        }
        let max = self.config.max_subscriptions_per_connection;
        if self.rooms.subscription_count(conn_id) >= max {
            return Err(AppError::rate_limit(format!(
                "Maximum subscriptions ({max}) reached"
            )));
        }
        Ok(())
    }

    /// Adds a subscription, enforcing the per-connection cap.
    pub(super) fn subscribe(&self, conn_id: ConnectionId, room: RoomId) -> AppResult<()> {
        self.ensure_subscription_capacity(conn_id, &room)?;
        if self.rooms.join(conn_id, room) {
            self.metrics.subscribed();
        }
        Ok(())
    }

    pub(super) fn leave_room(&self, handle: &ConnectionHandle, room: RoomId) {
        self.rooms.leave(handle.id, &room);
        handle.send(OutboundMessage::RoomLeft { room });
    }

    /// Asks the membership service whether the user may observe the room.
    pub(super) async fn authorize_room(&self, user_id: UserId, room: RoomId) -> AppResult<()> {
        let allowed = match room {
            RoomId::Server(server_id) => self.membership.is_server_member(user_id, server_id).await,
            RoomId::Channel(channel_id) | RoomId::Voice(channel_id) => {
                self.membership
                    .is_channel_accessible(user_id, channel_id)
                    .await
            }
            RoomId::Dm(conversation_id) => {
                self.membership
                    .is_conversation_participant(user_id, conversation_id)
                    .await
            }
        }
        .map_err(access_check_failed)?;

        if allowed {
            Ok(())
        } else {
            debug!(user_id = %user_id, room = %room, "Room access denied");
            Err(AppError::authorization(format!("Not authorized to access {room}")))
        }
    }

    /// Requires an existing subscription to the room.
    pub(super) fn require_subscription(&self, conn_id: ConnectionId, room: RoomId) -> AppResult<()> {
        if self.rooms.is_member(conn_id, &room) {
            Ok(())
        } else {
            Err(AppError::authorization(format!("Not subscribed to {room}")))
        }
    }

    /// Subscribes a freshly authenticated connection to its user's server rooms.
    pub(super) async fn join_server_rooms(&self, handle: &ConnectionHandle, user_id: UserId) {
        match self.membership.server_ids_for(user_id).await {
            Ok(server_ids) => {
                for server_id in server_ids {
                    if let Err(err) = self.subscribe(handle.id, RoomId::Server(server_id)) {
                        warn!(
                            conn_id = %handle.id,
                            server_id = %server_id,
                            error = %err,
                            "Skipping server room auto-join"
                        );
                        break;
                    }
                }
            }
            Err(err) => {
                warn!(
                    conn_id = %handle.id,
                    user_id = %user_id,
                    error = %err,
                    "Could not load server memberships; server rooms must be joined explicitly"
                );
            }
        }
    }
}
