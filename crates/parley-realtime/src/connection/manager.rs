//! Connection registry — connection lifecycle from open through
//! authentication to close.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use parley_core::config::RealtimeConfig;
use parley_core::traits::VerifiedIdentity;
use parley_core::types::UserId;
use parley_core::{AppError, AppResult};

use crate::message::types::OutboundMessage;
use crate::metrics::EngineMetrics;
use crate::presence::tracker::PresenceTracker;
use crate::room::registry::RoomRegistry;
use crate::room::types::RoomId;

use super::authenticator::WsAuthenticator;
use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The bound identity.
    pub identity: VerifiedIdentity,
    /// Presence change to broadcast, if the user's visible status changed.
    pub presence: Option<OutboundMessage>,
}

/// Result of closing a connection.
#[derive(Debug, Clone)]
pub struct Disconnected {
    /// Closed connection.
    pub conn_id: ConnectionId,
    /// User the connection was bound to.
    pub user_id: Option<UserId>,
    /// Rooms the connection was released from.
    pub rooms: Vec<RoomId>,
    /// Presence change to broadcast, if the user's visible status changed.
    pub presence: Option<OutboundMessage>,
}

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
    presence: Arc<PresenceTracker>,
    authenticator: WsAuthenticator,
    metrics: Arc<EngineMetrics>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        presence: Arc<PresenceTracker>,
        authenticator: WsAuthenticator,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            pool,
            rooms,
            presence,
            authenticator,
            metrics,
            config,
        }
    }

    /// Registers a new, unauthenticated connection.
    ///
    /// Returns the connection handle and a receiver for outbound events.
    pub fn register(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(tx));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        info!(conn_id = %handle.id, "WebSocket connection registered");

        (handle, rx)
    }

    /// Verifies a token and binds the connection to its user.
    ///
    /// On failure the connection stays open and unauthenticated.
    pub async fn authenticate(&self, conn_id: ConnectionId, token: &str) -> AppResult<Authenticated> {
        let handle = self
            .pool
            .get(&conn_id)
            .ok_or_else(|| AppError::not_found("Connection not found"))?;
        if handle.identity().is_some() {
            return Err(AppError::validation("Connection is already authenticated"));
        }

        let identity = self.authenticator.authenticate(token).await?;

        // The connection may have closed while the token was being verified.
        if !handle.is_alive() || self.pool.get(&conn_id).is_none() {
            return Err(AppError::authentication("Connection closed"));
        }

        let user_id = identity.user_id;
        self.presence
            .remember_username(user_id, identity.username.clone());

        let max = self.config.max_connections_per_user;
        let presence = self
            .pool
            .attach(user_id, handle.clone(), max, |count| {
                self.presence.on_connection_count_changed(user_id, count)
            })
            .ok_or_else(|| {
                warn!(
                    conn_id = %conn_id,
                    user_id = %user_id,
                    max,
                    "User at max connections, rejecting authentication"
                );
                AppError::rate_limit(format!("Maximum connections ({max}) reached"))
            })?;

        handle.bind(identity.clone());
        self.metrics.authenticated();

        info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection authenticated");

        Ok(Authenticated { identity, presence })
    }

    /// Unregisters a connection, releases its rooms, and updates presence.
    ///
    /// Returns `None` if the connection was already gone.
    pub fn unregister(&self, conn_id: ConnectionId) -> Option<Disconnected> {
        let (handle, presence) = self.pool.remove(&conn_id, |user_id, remaining| {
            self.presence.on_connection_count_changed(user_id, remaining)
        })?;
        handle.mark_closed();

        let rooms = self.rooms.leave_all(conn_id);
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            user_id = ?handle.user_id(),
            rooms = rooms.len(),
            "WebSocket connection unregistered"
        );

        Some(Disconnected {
            conn_id,
            user_id: handle.user_id(),
            rooms,
            presence: presence.flatten(),
        })
    }

    /// Gets a connection by ID.
    pub fn get(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(&conn_id)
    }

    /// Gets all authenticated connections of a user.
    pub fn user_connections(&self, user_id: UserId) -> Vec<Arc<ConnectionHandle>> {
        self.pool.user_connections(&user_id)
    }

    /// Returns total number of open connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns number of connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Marks every connection closed. Transports observe this and hang up.
    pub fn close_all(&self) {
        for handle in self.pool.all_connections() {
            handle.mark_closed();
        }
        info!("All WebSocket connections marked closed");
    }
}
