//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use parley_core::config::RealtimeConfig;

use crate::message::builder::build_ping;

use super::handle::ConnectionHandle;

/// Heartbeat configuration.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Timeout before considering connection dead.
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Run heartbeat loop for a connection.
///
/// Sends periodic pings and marks the connection closed when no pong
/// arrived within one interval plus the timeout.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    if config.ping_interval.is_zero() {
        tracing::warn!(conn_id = %handle.id, "Heartbeat disabled: zero ping interval");
        return;
    }
    let mut interval = time::interval(config.ping_interval);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let elapsed = Utc::now() - handle.last_pong();
        if let Ok(elapsed) = elapsed.to_std() {
            if elapsed > config.ping_interval + config.ping_timeout {
                tracing::warn!(
                    conn_id = %handle.id,
                    elapsed = ?elapsed,
                    "Heartbeat timeout, closing connection"
                );
                handle.mark_closed();
                break;
            }
        }

        if !handle.send(build_ping()) && !handle.is_alive() {
            tracing::debug!(conn_id = %handle.id, "Ping send failed on closed connection");
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sends_pings_until_closed() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = Arc::new(ConnectionHandle::new(tx));
        let config = HeartbeatConfig {
            ping_interval: Duration::from_secs(1),
            ping_timeout: Duration::from_secs(60),
        };
        let task = tokio::spawn(run_heartbeat(handle.clone(), config));

        time::sleep(Duration::from_millis(2500)).await;
        let mut pings = 0;
        while let Ok(msg) = rx.try_recv() {
            assert_eq!(msg.event_type(), "ping");
            pings += 1;
        }
        assert_eq!(pings, 2);

        handle.mark_closed();
        time::sleep(Duration::from_secs(2)).await;
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn test_zero_interval_returns_without_pinging() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = Arc::new(ConnectionHandle::new(tx));
        let config = HeartbeatConfig {
            ping_interval: Duration::ZERO,
            ping_timeout: Duration::from_secs(10),
        };
        run_heartbeat(handle.clone(), config).await;
        assert!(rx.try_recv().is_err());
        assert!(handle.is_alive());
    }

    #[test]
    fn test_config_from_realtime() {
        let config = HeartbeatConfig::from(&RealtimeConfig::default());
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.ping_timeout, Duration::from_secs(10));
    }
}
