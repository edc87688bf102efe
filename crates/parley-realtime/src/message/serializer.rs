//! JSON serialization for WebSocket frames.

use serde_json::Value;

use parley_core::AppError;

use super::types::{InboundEvent, OutboundMessage};

/// Serialize an outbound message to a JSON text frame.
pub fn serialize_outbound(msg: &OutboundMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

/// Deserialize an inbound frame.
///
/// Returns `Ok(None)` for frames that should be ignored: text that is not
/// JSON, objects without a string `type`, and unknown event types. A known
/// event type with a malformed payload is a validation error.
pub fn deserialize_inbound(text: &str) -> Result<Option<InboundEvent>, AppError> {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return Ok(None);
    };
    if !value.get("type").is_some_and(Value::is_string) {
        return Ok(None);
    }

    match serde_json::from_value::<InboundEvent>(value) {
        Ok(InboundEvent::Unknown) => Ok(None),
        Ok(event) => Ok(Some(event)),
        Err(err) => Err(AppError::validation(format!("Malformed event payload: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use parley_core::error::ErrorKind;
    use parley_core::types::ChannelId;

    use super::*;

    #[test]
    fn test_garbage_is_ignored() {
        assert!(matches!(deserialize_inbound("not json {"), Ok(None)));
        assert!(matches!(deserialize_inbound("[1,2,3]"), Ok(None)));
        assert!(matches!(deserialize_inbound(r#"{"type": 7}"#), Ok(None)));
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let parsed = deserialize_inbound(r#"{"type":"summon_dragon","power":9001}"#);
        assert!(matches!(parsed, Ok(None)));
    }

    #[test]
    fn test_known_type_with_bad_payload_is_validation_error() {
        let err = deserialize_inbound(r#"{"type":"join_voice","channel_id":"nope"}"#)
            .expect_err("should reject");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_send_message_parses() {
        let channel = ChannelId::new();
        let raw = format!(r#"{{"type":"send_message","channel_id":"{channel}","content":"hi"}}"#);
        match deserialize_inbound(&raw) {
            Ok(Some(InboundEvent::SendMessage {
                channel_id,
                conversation_id,
                content,
                reply_to,
            })) => {
                assert_eq!(channel_id, Some(channel));
                assert!(conversation_id.is_none());
                assert!(reply_to.is_none());
                assert_eq!(content, "hi");
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_voice_state_patch_is_flattened() {
        let channel = ChannelId::new();
        let raw = format!(r#"{{"type":"voice_state_change","channel_id":"{channel}","muted":true}}"#);
        match deserialize_inbound(&raw) {
            Ok(Some(InboundEvent::VoiceStateChange { patch, .. })) => {
                assert_eq!(patch.muted, Some(true));
                assert!(patch.deafened.is_none());
                assert!(patch.speaking.is_none());
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_outbound_uses_snake_case_tag() {
        let json = serialize_outbound(&OutboundMessage::AuthError {
            message: "Invalid token".into(),
        })
        .expect("serialize");
        assert_eq!(json, r#"{"type":"auth_error","message":"Invalid token"}"#);
    }
}
