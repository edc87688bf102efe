//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use parley_core::traits::VerifiedIdentity;
use parley_core::types::UserId;

use crate::message::types::OutboundMessage;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "user_id", rename_all = "snake_case")]
pub enum ConnectionState {
    /// Open, no identity bound yet.
    Unauthenticated,
    /// Bound to exactly one user for the rest of its life.
    Authenticated(UserId),
    /// Closed; sends are no-ops.
    Closed,
}

/// A handle to a single WebSocket connection.
///
/// Holds the bounded sender for pushing events to the client. Events pushed
/// through one handle are delivered in push order.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Identity bound on successful authentication.
    identity: OnceLock<VerifiedIdentity>,
    sender: mpsc::Sender<OutboundMessage>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    last_activity: Mutex<DateTime<Utc>>,
    last_pong: Mutex<DateTime<Utc>>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new unauthenticated connection handle.
    pub fn new(sender: mpsc::Sender<OutboundMessage>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            identity: OnceLock::new(),
            sender,
            connected_at: now,
            last_activity: Mutex::new(now),
            last_pong: Mutex::new(now),
            alive: AtomicBool::new(true),
        }
    }

    /// Push an event to this connection.
    ///
    /// Never blocks. Returns `false` if the connection is closed or its
    /// buffer is full.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                tracing::warn!(
                    conn_id = %self.id,
                    event = msg.event_type(),
                    "Connection send buffer full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        if !self.is_alive() {
            return ConnectionState::Closed;
        }
        match self.identity.get() {
            Some(identity) => ConnectionState::Authenticated(identity.user_id),
            None => ConnectionState::Unauthenticated,
        }
    }

    /// Bind the connection to a user. Returns `false` if already bound.
    pub(crate) fn bind(&self, identity: VerifiedIdentity) -> bool {
        self.identity.set(identity).is_ok()
    }

    /// The bound identity, if authenticated.
    pub fn identity(&self) -> Option<&VerifiedIdentity> {
        self.identity.get()
    }

    /// The bound user, if authenticated.
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.get().map(|identity| identity.user_id)
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Update last activity timestamp.
    pub fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Utc::now();
    }

    /// Record a pong response.
    pub fn record_pong(&self) {
        let now = Utc::now();
        *self
            .last_pong
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
        self.touch();
    }

    /// Last pong received (or connect time).
    pub fn last_pong(&self) -> DateTime<Utc> {
        *self
            .last_pong
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Last inbound activity.
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
