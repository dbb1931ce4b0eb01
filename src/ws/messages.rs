//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client clean-topic event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to clean topics. `"*"` subscribes to all of them.
    Subscribe {
        /// Topic names, e.g. `["clean.combined"]`.
        topics: Vec<String>,
    },
    /// Unsubscribe from clean topics. `"*"` clears every subscription.
    Unsubscribe {
        /// Topic names.
        topics: Vec<String>,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscribe_command() {
        let payload = serde_json::json!({"command": "subscribe", "topics": ["clean.price", "*"]});
        let Ok(command) = serde_json::from_value::<WsCommand>(payload) else {
            panic!("subscribe should parse");
        };
        assert_eq!(
            command,
            WsCommand::Subscribe {
                topics: vec!["clean.price".to_string(), "*".to_string()]
            }
        );
    }

    #[test]
    fn unknown_command_does_not_parse() {
        let payload = serde_json::json!({"command": "swap", "topics": []});
        assert!(serde_json::from_value::<WsCommand>(payload).is_err());
    }

    #[test]
    fn envelope_uses_type_field() {
        let msg = WsMessage::new("1".to_string(), WsMessageType::Event, serde_json::json!({}));
        let Ok(json) = serde_json::to_value(&msg) else {
            panic!("envelope should serialize");
        };
        assert_eq!(json["type"], "event");
    }
}
