//! Real-time WebSocket engine configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Accepted typing expiry, in milliseconds.
pub const TYPING_TIMEOUT_MS_RANGE: RangeInclusive<u64> = 3_000..=5_000;

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum simultaneously authenticated connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Outbound queue length per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// WebSocket ping timeout in seconds.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Maximum room subscriptions per connection.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_connection: usize,
    /// Inactivity period after which a typing indicator expires.
    #[serde(default = "default_typing_timeout")]
    pub typing_timeout_ms: u64,
    /// Maximum message length in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Maximum inbound frame size in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_subscriptions_per_connection: default_max_subscriptions(),
            typing_timeout_ms: default_typing_timeout(),
            max_message_length: default_max_message_length(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl RealtimeConfig {
    /// Typing indicator expiry as a `Duration`.
    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        let positive = [
            ("max_connections_per_user", self.max_connections_per_user),
            ("channel_buffer_size", self.channel_buffer_size),
            ("max_subscriptions_per_connection", self.max_subscriptions_per_connection),
            ("max_message_length", self.max_message_length),
            ("max_frame_bytes", self.max_frame_bytes),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(AppError::configuration(format!(
                    "realtime.{name} must be greater than 0"
                )));
            }
        }
        if self.ping_interval_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.ping_interval_seconds must be greater than 0",
            ));
        }
        if !TYPING_TIMEOUT_MS_RANGE.contains(&self.typing_timeout_ms) {
            return Err(AppError::configuration(format!(
                "realtime.typing_timeout_ms must be between {} and {}, got {}",
                TYPING_TIMEOUT_MS_RANGE.start(),
                TYPING_TIMEOUT_MS_RANGE.end(),
                self.typing_timeout_ms
            )));
        }
        Ok(())
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    10
}

fn default_max_subscriptions() -> usize {
    100
}

fn default_typing_timeout() -> u64 {
    5000
}

fn default_max_message_length() -> usize {
    2000
}

fn default_max_frame_bytes() -> usize {
    65_536
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RealtimeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = RealtimeConfig {
            channel_buffer_size: 0,
            ..RealtimeConfig::default()
        };
        let err = config.validate().expect_err("zero buffer");
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("channel_buffer_size"));

        let config = RealtimeConfig {
            max_connections_per_user: 0,
            ..RealtimeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RealtimeConfig {
            ping_interval_seconds: 0,
            ..RealtimeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_typing_timeout_bounds() {
        for (ms, ok) in [(2_999, false), (3_000, true), (5_000, true), (60_000, false)] {
            let config = RealtimeConfig {
                typing_timeout_ms: ms,
                ..RealtimeConfig::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "typing_timeout_ms = {ms}");
        }
    }
}
