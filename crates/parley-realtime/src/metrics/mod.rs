//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    authenticated_total: AtomicU64,
    auth_failures: AtomicU64,
    messages_received: AtomicU64,
    messages_sent: AtomicU64,
    subscriptions_total: AtomicU64,
    actions_rejected: AtomicU64,
    voice_capacity_rejections: AtomicU64,
    typing_expirations: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection was opened.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection was closed.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// A connection authenticated.
    pub fn authenticated(&self) {
        self.authenticated_total.fetch_add(1, Ordering::Relaxed);
    }

    /// An authentication attempt failed.
    pub fn auth_failed(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound frame was received.
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// `count` outbound events were queued.
    pub fn messages_sent(&self, count: usize) {
        self.messages_sent.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// A room subscription was added.
    pub fn subscribed(&self) {
        self.subscriptions_total.fetch_add(1, Ordering::Relaxed);
    }

    /// An action was rejected with an error event.
    pub fn action_rejected(&self) {
        self.actions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A voice join was rejected because the channel was full.
    pub fn voice_capacity_rejected(&self) {
        self.voice_capacity_rejections
            .fetch_add(1, Ordering::Relaxed);
    }

    /// A typing indicator expired.
    pub fn typing_expired(&self) {
        self.typing_expirations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            authenticated_total: self.authenticated_total.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            subscriptions_total: self.subscriptions_total.load(Ordering::Relaxed),
            actions_rejected: self.actions_rejected.load(Ordering::Relaxed),
            voice_capacity_rejections: self.voice_capacity_rejections.load(Ordering::Relaxed),
            typing_expirations: self.typing_expirations.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever opened.
    pub connections_total: u64,
    /// Currently open connections.
    pub connections_active: u64,
    /// Successful authentications.
    pub authenticated_total: u64,
    /// Failed authentications.
    pub auth_failures: u64,
    /// Inbound frames received.
    pub messages_received: u64,
    /// Outbound events queued.
    pub messages_sent: u64,
    /// Room subscriptions added.
    pub subscriptions_total: u64,
    /// Actions rejected with an error event.
    pub actions_rejected: u64,
    /// Voice joins rejected for capacity.
    pub voice_capacity_rejections: u64,
    /// Typing indicators that expired.
    pub typing_expirations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_connections_never_underflow() {
        let metrics = EngineMetrics::new();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.connection_closed();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connections_total, 1);
        assert_eq!(snapshot.connections_active, 0);
    }
}
