//! Typing indicator manager.
//!
//! One indicator per (destination, user). Each start arms a fresh expiry
//! timer and cancels the previous one. A timer only removes the indicator
//! if its generation still matches, so a refreshed or stopped indicator is
//! never expired by a stale timer and expiry fires at most once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use parley_core::types::{Destination, UserId};

use crate::connection::handle::ConnectionId;
use crate::fanout::Fanout;
use crate::message::types::OutboundMessage;
use crate::metrics::EngineMetrics;
use crate::room::types::RoomId;

use super::indicator::TypingIndicator;

type TypingKey = (Destination, UserId);

/// Tracks typing indicators and emits start/stop events.
#[derive(Debug)]
pub struct TypingManager {
    indicators: Arc<DashMap<TypingKey, TypingIndicator>>,
    fanout: Arc<Fanout>,
    metrics: Arc<EngineMetrics>,
    timeout: Duration,
    next_generation: AtomicU64,
}

impl TypingManager {
    /// Creates a manager whose indicators expire after `timeout` of
    /// inactivity.
    pub fn new(timeout: Duration, fanout: Arc<Fanout>, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            indicators: Arc::new(DashMap::new()),
            fanout,
            metrics,
            timeout,
            next_generation: AtomicU64::new(0),
        }
    }

    /// Start or refresh typing. Emits `user_typing` to the destination's
    /// room, skipping the originating connection.
    pub fn start_typing(
        &self,
        destination: Destination,
        user_id: UserId,
        username: Option<String>,
        conn_id: ConnectionId,
    ) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let started_at = Utc::now();
        let key = (destination, user_id);

        let indicator = TypingIndicator {
            connection_id: conn_id,
            started_at,
            generation,
            cancel: cancel.clone(),
        };
        if let Some(previous) = self.indicators.insert(key, indicator) {
            previous.cancel.cancel();
        }
        self.arm_expiry(key, generation, cancel);

        let event = OutboundMessage::UserTyping {
            destination,
            user_id,
            username,
            started_at,
        };
        self.fanout
            .to_room(&RoomId::from(destination), &event, Some(conn_id));
    }

    /// Stop typing. Emits `user_stopped_typing` only if an indicator existed.
    pub fn stop_typing(&self, destination: Destination, user_id: UserId) -> bool {
        match self.indicators.remove(&(destination, user_id)) {
            Some((_, indicator)) => {
                indicator.cancel.cancel();
                emit_stopped(&self.fanout, destination, user_id, indicator.connection_id);
                true
            }
            None => false,
        }
    }

    /// Clears every indicator started by a connection. Returns how many.
    pub fn clear_connection(&self, conn_id: ConnectionId) -> usize {
        let keys: Vec<TypingKey> = self
            .indicators
            .iter()
            .filter(|entry| entry.connection_id == conn_id)
            .map(|entry| *entry.key())
            .collect();

        let mut cleared = 0;
        for key in keys {
            if let Some((_, indicator)) = self
                .indicators
                .remove_if(&key, |_, indicator| indicator.connection_id == conn_id)
            {
                indicator.cancel.cancel();
                emit_stopped(&self.fanout, key.0, key.1, conn_id);
                cleared += 1;
            }
        }
        if cleared > 0 {
            debug!(conn_id = %conn_id, cleared, "Cleared typing indicators for connection");
        }
        cleared
    }

    /// Whether the user is currently typing in the destination.
    pub fn is_typing(&self, destination: Destination, user_id: UserId) -> bool {
        self.indicators.contains_key(&(destination, user_id))
    }

    /// Users currently typing in a destination.
    pub fn typing_in(&self, destination: Destination) -> Vec<UserId> {
        self.indicators
            .iter()
            .filter(|entry| entry.key().0 == destination)
            .map(|entry| entry.key().1)
            .collect()
    }

    /// Number of active indicators.
    pub fn active_count(&self) -> usize {
        self.indicators.len()
    }

    fn arm_expiry(&self, key: TypingKey, generation: u64, cancel: CancellationToken) {
        let indicators = Arc::clone(&self.indicators);
        let fanout = Arc::clone(&self.fanout);
        let metrics = Arc::clone(&self.metrics);
        let timeout = self.timeout;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    let expired = indicators
                        .remove_if(&key, |_, indicator| indicator.generation == generation);
                    if let Some(((destination, user_id), indicator)) = expired {
                        debug!(user_id = %user_id, destination = %destination, "Typing indicator expired");
                        metrics.typing_expired();
                        emit_stopped(&fanout, destination, user_id, indicator.connection_id);
                    }
                }
            }
        });
    }
}

fn emit_stopped(fanout: &Fanout, destination: Destination, user_id: UserId, origin: ConnectionId) {
    let event = OutboundMessage::UserStoppedTyping {
        destination,
        user_id,
    };
    fanout.to_room(&RoomId::from(destination), &event, Some(origin));
}
