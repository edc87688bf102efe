//! A single room with its subscriber set.

use std::collections::HashSet;

use crate::connection::handle::ConnectionId;

use super::types::RoomId;

/// A single fanout room.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Subscribed connection IDs.
    pub subscribers: HashSet<ConnectionId>,
}

impl Room {
    /// Creates a new empty room.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            subscribers: HashSet::new(),
        }
    }

    /// Adds a subscriber. Returns `true` if it was not already present.
    pub fn subscribe(&mut self, conn_id: ConnectionId) -> bool {
        self.subscribers.insert(conn_id)
    }

    /// Removes a subscriber. Returns `true` if it was present.
    pub fn unsubscribe(&mut self, conn_id: ConnectionId) -> bool {
        self.subscribers.remove(&conn_id)
    }

    /// Returns subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns whether the room has any subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Returns all subscriber connection IDs.
    pub fn subscribers(&self) -> Vec<ConnectionId> {
        self.subscribers.iter().copied().collect()
    }
}
