//! Builder helpers for constructing outbound messages.

use chrono::Utc;

use parley_core::error::ErrorKind;

use super::types::OutboundMessage;

/// Build an error event for the acting connection.
pub fn build_error(kind: ErrorKind, message: impl Into<String>) -> OutboundMessage {
    OutboundMessage::Error {
        code: kind.to_string(),
        message: message.into(),
    }
}

/// Build an authentication failure event.
pub fn build_auth_error(message: impl Into<String>) -> OutboundMessage {
    OutboundMessage::AuthError {
        message: message.into(),
    }
}

/// Build a heartbeat ping.
pub fn build_ping() -> OutboundMessage {
    OutboundMessage::Ping {
        timestamp: Utc::now(),
    }
}

/// Error code for events sent before authentication.
pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";

/// Build the rejection for an event sent before authentication.
pub fn build_unauthenticated() -> OutboundMessage {
    OutboundMessage::Error {
        code: UNAUTHENTICATED.to_string(),
        message: "Authenticate before sending events".to_string(),
    }
}
