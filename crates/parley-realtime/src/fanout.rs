//! Fanout: the single push point from engine state to client connections.
//!
//! Recipients are resolved from the room index at send time, so a
//! connection that left a room before the call never receives the event.

use std::sync::Arc;

use tracing::trace;

use parley_core::types::UserId;

use crate::connection::handle::ConnectionId;
use crate::connection::pool::ConnectionPool;
use crate::message::types::OutboundMessage;
use crate::metrics::EngineMetrics;
use crate::room::registry::RoomRegistry;
use crate::room::types::RoomId;

/// Delivers outbound events to rooms, users, and single connections.
#[derive(Debug)]
pub struct Fanout {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
    metrics: Arc<EngineMetrics>,
}

impl Fanout {
    /// Creates a new fanout over the given pool and room index.
    pub fn new(
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            pool,
            rooms,
            metrics,
        }
    }

    /// Sends to every current member of a room, optionally skipping one
    /// connection. Returns the number of connections the event was queued for.
    pub fn to_room(
        &self,
        room: &RoomId,
        msg: &OutboundMessage,
        except: Option<ConnectionId>,
    ) -> usize {
        let delivered = self
            .rooms
            .members_of(room)
            .into_iter()
            .filter(|conn_id| Some(*conn_id) != except)
            .filter_map(|conn_id| self.pool.get(&conn_id))
            .filter(|handle| handle.send(msg.clone()))
            .count();

        trace!(room = %room, event = msg.event_type(), delivered, "Fanned out to room");
        self.metrics.messages_sent(delivered);
        delivered
    }

    /// Sends to a single connection. Unknown or closed connections are a no-op.
    pub fn to_connection(&self, conn_id: ConnectionId, msg: OutboundMessage) -> bool {
        let sent = self
            .pool
            .get(&conn_id)
            .is_some_and(|handle| handle.send(msg));
        if sent {
            self.metrics.messages_sent(1);
        }
        sent
    }

    /// Sends to every authenticated connection of a user.
    pub fn to_user(&self, user_id: UserId, msg: &OutboundMessage) -> usize {
        let delivered = self
            .pool
            .user_connections(&user_id)
            .into_iter()
            .filter(|handle| handle.send(msg.clone()))
            .count();
        self.metrics.messages_sent(delivered);
        delivered
    }

    /// Sends to every authenticated connection, optionally skipping one.
    pub fn broadcast(&self, msg: &OutboundMessage, except: Option<ConnectionId>) -> usize {
        let delivered = self
            .pool
            .authenticated_connections()
            .into_iter()
            .filter(|handle| Some(handle.id) != except)
            .filter(|handle| handle.send(msg.clone()))
            .count();

        trace!(event = msg.event_type(), delivered, "Broadcast to all connections");
        self.metrics.messages_sent(delivered);
        delivered
    }
}
