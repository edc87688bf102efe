//! Room registry: the membership index used by fanout.
//!
//! Holds the forward index (room to subscribers) and the reverse index
//! (connection to rooms). Membership does not imply authorization; the
//! router checks access before calling [`RoomRegistry::join`].

use dashmap::DashMap;
use tracing::debug;

use crate::connection::handle::ConnectionId;

use super::room::Room;
use super::subscription::SubscriptionTracker;
use super::types::RoomId;

/// Registry of all active rooms and their subscriptions.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Room>,
    subscriptions: SubscriptionTracker,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            subscriptions: SubscriptionTracker::new(),
        }
    }

    /// Subscribes a connection to a room. Returns `true` if newly added.
    pub fn join(&self, conn_id: ConnectionId, room: RoomId) -> bool {
        let added = self
            .rooms
            .entry(room)
            .or_insert_with(|| Room::new(room))
            .subscribe(conn_id);

        if added {
            self.subscriptions.add(conn_id, room);
            debug!(conn_id = %conn_id, room = %room, "Joined room");
        }
        added
    }

    /// Unsubscribes a connection from a room. Returns `true` if it was a member.
    pub fn leave(&self, conn_id: ConnectionId, room: &RoomId) -> bool {
        let removed = self.remove_subscriber(conn_id, room);
        if removed {
            self.subscriptions.remove(conn_id, room);
            debug!(conn_id = %conn_id, room = %room, "Left room");
        }
        removed
    }

    /// Unsubscribes a connection from every room it belongs to.
    pub fn leave_all(&self, conn_id: ConnectionId) -> Vec<RoomId> {
        let rooms: Vec<RoomId> = self.subscriptions.remove_all(conn_id).into_iter().collect();
        for room in &rooms {
            self.remove_subscriber(conn_id, room);
        }
        if !rooms.is_empty() {
            debug!(conn_id = %conn_id, count = rooms.len(), "Released all room subscriptions");
        }
        rooms
    }

    /// Returns the current subscribers of a room.
    pub fn members_of(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|r| r.subscribers())
            .unwrap_or_default()
    }

    /// Returns the rooms a connection is subscribed to.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> Vec<RoomId> {
        self.subscriptions.rooms(conn_id).into_iter().collect()
    }

    /// Whether the connection is subscribed to the room.
    pub fn is_member(&self, conn_id: ConnectionId, room: &RoomId) -> bool {
        self.subscriptions.contains(conn_id, room)
    }

    /// Returns the subscription count for a connection.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Returns the subscriber count for a room.
    pub fn room_size(&self, room: &RoomId) -> usize {
        self.rooms
            .get(room)
            .map(|r| r.subscriber_count())
            .unwrap_or(0)
    }

    /// Returns the number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn remove_subscriber(&self, conn_id: ConnectionId, room: &RoomId) -> bool {
        let Some(mut entry) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = entry.unsubscribe(conn_id);
        if entry.is_empty() {
            drop(entry);
            self.rooms.remove_if(room, |_, r| r.is_empty());
        }
        removed
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
