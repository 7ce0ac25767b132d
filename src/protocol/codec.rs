use serde::Deserialize;
use serde_json::Value;

use crate::protocol::{ClientMessage, ProtocolError, ServerMessage};

/// Result of decoding one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Message(ServerMessage),
    /// Well-formed frame whose `type` this client does not know.
    Unrecognized(String),
}

/// Serializes an outbound frame to JSON text.
///
/// # Errors
///
/// Returns [`ProtocolError::Json`] if a payload value cannot be serialized.
pub fn encode(msg: &ClientMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

/// Parses one inbound JSON text frame.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the text is not JSON, not an object,
/// has no `type`, or a known `type` carries a malformed payload.
pub fn decode(text: &str) -> Result<Decoded, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let type_name = match &value {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => return Err(ProtocolError::MissingType),
        },
        _ => return Err(ProtocolError::NotAnObject),
    };

    match ServerMessage::deserialize(value)? {
        ServerMessage::Unrecognized => Ok(Decoded::Unrecognized(type_name)),
        msg => Ok(Decoded::Message(msg)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::protocol::types::{MediaKind, TransportDirection};

    #[test]
    fn decodes_room_joined_with_nested_camel_case() {
        let text = r#"{
            "type": "room_joined",
            "room_info": {
                "roomId": "R1",
                "presenterCount": 2,
                "features": {"maxPresenters": 2, "allowScreenShare": true}
            },
            "peers": [{"id": "p2", "displayName": "Bob", "role": "presenter"}]
        }"#;

        match decode(text).unwrap() {
            Decoded::Message(ServerMessage::RoomJoined {
                room_info,
                peers,
                peer_id,
            }) => {
                assert_eq!(room_info.room_id, "R1");
                assert_eq!(room_info.features.max_presenters, 2);
                assert_eq!(peers.len(), 1);
                assert_eq!(peers[0].display_name, "Bob");
                assert!(peer_id.is_none());
            }
            other => panic!("expected RoomJoined, got {other:?}"),
        }
    }

    #[test]
    fn decodes_transport_created() {
        let text = r#"{
            "type": "webrtc_transport_created",
            "direction": "send",
            "transport_options": {
                "id": "t-1",
                "iceParameters": {"usernameFragment": "u"},
                "iceCandidates": [],
                "dtlsParameters": {"role": "auto"}
            }
        }"#;
        match decode(text).unwrap() {
            Decoded::Message(ServerMessage::WebrtcTransportCreated {
                direction,
                transport_options,
            }) => {
                assert_eq!(direction, TransportDirection::Send);
                assert_eq!(transport_options.id, "t-1");
                assert!(transport_options.sctp_parameters.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn consumer_created_accepts_id_alias_and_defaults() {
        let text = r#"{"type":"consumer_created","id":"c-1","producer_id":"pr-1","kind":"audio"}"#;
        match decode(text).unwrap() {
            Decoded::Message(ServerMessage::ConsumerCreated {
                consumer_id,
                kind,
                producer_paused,
                ..
            }) => {
                assert_eq!(consumer_id, "c-1");
                assert_eq!(kind, MediaKind::Audio);
                assert!(!producer_paused);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_reported_not_failed() {
        let decoded = decode(r#"{"type":"chat_message","text":"hi"}"#).unwrap();
        assert_eq!(decoded, Decoded::Unrecognized("chat_message".into()));
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(decode("{not json"), Err(ProtocolError::Json(_))));
        assert!(matches!(decode("[1,2]"), Err(ProtocolError::NotAnObject)));
        assert!(matches!(decode(r#"{"peer_id":"x"}"#), Err(ProtocolError::MissingType)));
        // known type, wrong payload shape
        assert!(matches!(
            decode(r#"{"type":"peer_left"}"#),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn room_muted_all_flag_is_optional() {
        match decode(r#"{"type":"room_muted_all","muted_all":true}"#).unwrap() {
            Decoded::Message(ServerMessage::RoomMutedAll { muted_all }) => {
                assert_eq!(muted_all, Some(true));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            decode(r#"{"type":"room_unlocked"}"#).unwrap(),
            Decoded::Message(ServerMessage::RoomUnlocked { is_locked: None })
        ));
    }
}
