//! Connection pool — tracks open connections by ID and authenticated
//! connections by user.
//!
//! Per-user attach and detach run under the user's map entry, and the
//! caller-supplied callback observes the new count inside that same
//! critical section. Count transitions for one user are therefore seen in
//! the order they happen.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use parley_core::types::UserId;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all open WebSocket connections.
#[derive(Debug)]
pub struct ConnectionPool {
    /// User ID → authenticated connections of that user.
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self {
            by_user: DashMap::new(),
            by_id: DashMap::new(),
        }
    }

    /// Adds an open (not yet authenticated) connection.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Attaches a connection to a user, unless the user already has `max`
    /// connections.
    ///
    /// `on_count` receives the user's new connection count while the
    /// user's entry is still locked. Returns `None` when the cap is hit.
    pub fn attach<R>(
        &self,
        user_id: UserId,
        handle: Arc<ConnectionHandle>,
        max: usize,
        on_count: impl FnOnce(usize) -> R,
    ) -> Option<R> {
        if max == 0 {
            return None;
        }
        let mut connections = self.by_user.entry(user_id).or_default();
        if connections.len() >= max {
            return None;
        }
        connections.push(handle);
        Some(on_count(connections.len()))
    }

    /// Removes a connection from the pool.
    ///
    /// If it was attached to a user, `on_count` receives the user's remaining
    /// connection count while the user's entry is still locked.
    pub fn remove<R>(
        &self,
        conn_id: &ConnectionId,
        on_count: impl FnOnce(UserId, usize) -> R,
    ) -> Option<(Arc<ConnectionHandle>, Option<R>)> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        let Some(user_id) = handle.user_id() else {
            return Some((handle, None));
        };

        let outcome = match self.by_user.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let before = entry.get().len();
                entry.get_mut().retain(|c| c.id != *conn_id);
                let remaining = entry.get().len();
                if remaining == before {
                    None
                } else {
                    let result = on_count(user_id, remaining);
                    if remaining == 0 {
                        entry.remove();
                    }
                    Some(result)
                }
            }
            Entry::Vacant(_) => None,
        };
        Some((handle, outcome))
    }

    /// Gets all authenticated connections for a user.
    pub fn user_connections(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns total number of open connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of users with at least one authenticated connection.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns all authenticated connection handles.
    pub fn authenticated_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}
