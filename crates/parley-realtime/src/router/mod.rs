//! Event router: parses inbound frames, gates them on authentication and
//! authorization, applies them to engine state, and fans out the results.
//!
//! Every rejected action produces exactly one error event, sent only to
//! the acting connection. Nothing error-related is ever sent to a room.

mod errors;
mod messaging;
mod rooms;
mod voice;

use std::sync::Arc;

use tracing::{info, trace, warn};

use parley_core::config::RealtimeConfig;
use parley_core::error::ErrorKind;
use parley_core::traits::{ChannelDirectory, MembershipService, MessageStore};
use parley_core::types::{Destination, PersistedMessage, UserId};
use parley_core::AppError;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::manager::ConnectionManager;
use crate::fanout::Fanout;
use crate::message::builder;
use crate::message::serializer;
use crate::message::types::{InboundEvent, OutboundMessage};
use crate::message::validator;
use crate::metrics::EngineMetrics;
use crate::presence::tracker::PresenceTracker;
use crate::room::registry::RoomRegistry;
use crate::room::types::RoomId;
use crate::typing::TypingManager;
use crate::voice::VoiceManager;

/// Routes client events through the engine.
#[derive(Debug)]
pub struct EventRouter {
    config: RealtimeConfig,
    connections: Arc<ConnectionManager>,
    rooms: Arc<RoomRegistry>,
    presence: Arc<PresenceTracker>,
    typing: Arc<TypingManager>,
    voice: Arc<VoiceManager>,
    fanout: Arc<Fanout>,
    membership: Arc<dyn MembershipService>,
    messages: Arc<dyn MessageStore>,
    channels: Arc<dyn ChannelDirectory>,
    metrics: Arc<EngineMetrics>,
}

impl EventRouter {
    /// Creates a router over the given engine components and collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RealtimeConfig,
        connections: Arc<ConnectionManager>,
        rooms: Arc<RoomRegistry>,
        presence: Arc<PresenceTracker>,
        typing: Arc<TypingManager>,
        voice: Arc<VoiceManager>,
        fanout: Arc<Fanout>,
        membership: Arc<dyn MembershipService>,
        messages: Arc<dyn MessageStore>,
        channels: Arc<dyn ChannelDirectory>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            config,
            connections,
            rooms,
            presence,
            typing,
            voice,
            fanout,
            membership,
            messages,
            channels,
            metrics,
        }
    }

    /// Handles one raw text frame from a connection.
    ///
    /// Frames that are not JSON, lack a string `type`, or name an unknown
    /// event are ignored. Known events with malformed payloads are rejected.
    pub async fn handle_frame(&self, conn_id: ConnectionId, raw: &str) {
        let Some(handle) = self.connections.get(conn_id) else {
            warn!(conn_id = %conn_id, "Frame from unknown connection");
            return;
        };
        if !handle.is_alive() {
            return;
        }
        handle.touch();
        self.metrics.message_received();

        if let Err(err) = validator::validate_frame(raw, self.config.max_frame_bytes) {
            self.reject(&handle, &err, ErrorKind::Validation);
            return;
        }

        match serializer::deserialize_inbound(raw) {
            Ok(Some(event)) => self.dispatch(&handle, event).await,
            Ok(None) => trace!(conn_id = %conn_id, "Ignoring unrecognized frame"),
            Err(err) => self.reject(&handle, &err, ErrorKind::Validation),
        }
    }

    /// Applies a parsed event on behalf of a connection.
    pub async fn dispatch(&self, handle: &Arc<ConnectionHandle>, event: InboundEvent) {
        match &event {
            InboundEvent::Authenticate { token } => {
                self.authenticate(handle, token).await;
                return;
            }
            InboundEvent::Pong { .. } => {
                handle.record_pong();
                return;
            }
            InboundEvent::Unknown => return,
            _ => {}
        }

        let Some(identity) = handle.identity().cloned() else {
            self.metrics.action_rejected();
            handle.send(builder::build_unauthenticated());
            return;
        };

        let result = match event {
            InboundEvent::JoinRoom { room_kind, room_id } => {
                self.join_room(handle, identity.user_id, RoomId::new(room_kind, room_id))
                    .await
            }
            InboundEvent::LeaveRoom { room_kind, room_id } => {
                self.leave_room(handle, RoomId::new(room_kind, room_id));
                Ok(())
            }
            InboundEvent::SendMessage {
                channel_id,
                conversation_id,
                content,
                reply_to,
            } => match Destination::from_parts(channel_id, conversation_id) {
                Ok(destination) => {
                    self.send_message(&identity, destination, content, reply_to)
                        .await
                }
                Err(err) => Err(err),
            },
            InboundEvent::TypingStart {
                channel_id,
                conversation_id,
            } => Destination::from_parts(channel_id, conversation_id)
                .and_then(|destination| self.typing_start(handle, &identity, destination)),
            InboundEvent::TypingStop {
                channel_id,
                conversation_id,
            } => Destination::from_parts(channel_id, conversation_id).map(|destination| {
                self.typing.stop_typing(destination, identity.user_id);
            }),
            InboundEvent::StatusChange {
                status,
                custom_status,
            } => self.status_change(handle, &identity, &status, custom_status),
            InboundEvent::JoinVoice { channel_id } => {
                self.join_voice(handle, &identity, channel_id).await
            }
            InboundEvent::LeaveVoice { channel_id } => {
                self.leave_voice(handle, identity.user_id, channel_id);
                Ok(())
            }
            InboundEvent::VoiceStateChange { channel_id, patch } => {
                self.voice_state_change(handle, identity.user_id, channel_id, patch);
                Ok(())
            }
            InboundEvent::AddReaction {
                message_id,
                emoji,
                channel_id,
                conversation_id,
            } => Destination::from_parts(channel_id, conversation_id).and_then(|destination| {
                self.react(handle, identity.user_id, destination, message_id, emoji, true)
            }),
            InboundEvent::RemoveReaction {
                message_id,
                emoji,
                channel_id,
                conversation_id,
            } => Destination::from_parts(channel_id, conversation_id).and_then(|destination| {
                self.react(handle, identity.user_id, destination, message_id, emoji, false)
            }),
            InboundEvent::Authenticate { .. } | InboundEvent::Pong { .. } | InboundEvent::Unknown => {
                Ok(())
            }
        };

        if let Err(err) = result {
            self.reject(handle, &err, ErrorKind::Validation);
        }
    }

    /// Fans a persisted message out to its channel or conversation room,
    /// sender included. Returns the number of connections reached.
    pub fn publish_message(&self, message: &PersistedMessage) -> usize {
        let room = RoomId::from(message.destination);
        self.fanout.to_room(
            &room,
            &OutboundMessage::NewMessage {
                message: message.clone(),
            },
            None,
        )
    }

    /// Tears down a connection: typing indicators, voice seats, room
    /// subscriptions, then presence. Safe to call more than once.
    pub fn disconnect(&self, conn_id: ConnectionId) {
        self.typing.clear_connection(conn_id);

        for leave in self.voice.leave_connection(conn_id) {
            self.emit_voice_left(conn_id, &leave);
        }

        if let Some(disconnected) = self.connections.unregister(conn_id) {
            if let (Some(user_id), Some(_)) = (disconnected.user_id, &disconnected.presence) {
                self.broadcast_presence(user_id, None);
            }
            info!(
                conn_id = %conn_id,
                user_id = ?disconnected.user_id,
                "Connection disconnected"
            );
        }
    }

    async fn authenticate(&self, handle: &Arc<ConnectionHandle>, token: &str) {
        if handle.identity().is_some() {
            self.reject(
                handle,
                &AppError::validation("Connection is already authenticated"),
                ErrorKind::Validation,
            );
            return;
        }

        let authenticated = match self.connections.authenticate(handle.id, token).await {
            Ok(authenticated) => authenticated,
            Err(err) => {
                self.metrics.auth_failed();
                warn!(conn_id = %handle.id, error = %err, "Authentication failed");
                let message = if err.kind.is_client_facing() {
                    err.message
                } else {
                    "Authentication failed".to_string()
                };
                handle.send(builder::build_auth_error(message));
                return;
            }
        };

        let user_id = authenticated.identity.user_id;
        handle.send(OutboundMessage::Authenticated {
            user_id,
            username: authenticated.identity.username.clone(),
        });

        if authenticated.presence.is_some() {
            self.broadcast_presence(user_id, Some(handle.id));
        }

        self.join_server_rooms(handle, user_id).await;
    }

    /// Broadcasts the user's current presence to every authenticated
    /// connection except `except`.
    fn broadcast_presence(&self, user_id: UserId, except: Option<ConnectionId>) {
        self.presence
            .publish(user_id, |event| self.fanout.broadcast(event, except));
    }

    fn reject(&self, handle: &ConnectionHandle, err: &AppError, fallback: ErrorKind) {
        self.metrics.action_rejected();
        handle.send(errors::client_error(handle.id, err, fallback));
    }
}
