//! Reverse index: connection to the rooms it is subscribed to.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::types::RoomId;

/// Tracks connection-to-room subscription mappings.
#[derive(Debug)]
pub struct SubscriptionTracker {
    conn_to_rooms: DashMap<ConnectionId, HashSet<RoomId>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self {
            conn_to_rooms: DashMap::new(),
        }
    }

    /// Records a subscription.
    pub fn add(&self, conn_id: ConnectionId, room: RoomId) {
        self.conn_to_rooms.entry(conn_id).or_default().insert(room);
    }

    /// Removes a subscription.
    pub fn remove(&self, conn_id: ConnectionId, room: &RoomId) {
        if let Some(mut rooms) = self.conn_to_rooms.get_mut(&conn_id) {
            rooms.remove(room);
            if rooms.is_empty() {
                drop(rooms);
                self.conn_to_rooms.remove_if(&conn_id, |_, rooms| rooms.is_empty());
            }
        }
    }

    /// Whether the connection is subscribed to the room.
    pub fn contains(&self, conn_id: ConnectionId, room: &RoomId) -> bool {
        self.conn_to_rooms
            .get(&conn_id)
            .is_some_and(|rooms| rooms.contains(room))
    }

    /// Gets all rooms a connection is subscribed to.
    pub fn rooms(&self, conn_id: ConnectionId) -> HashSet<RoomId> {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns the number of subscriptions for a connection.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all subscriptions for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<RoomId> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}

impl Default for SubscriptionTracker {
    fn default() -> Self {
        Self::new()
    }
}
