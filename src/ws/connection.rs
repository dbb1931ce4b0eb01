//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! applying subscription commands and forwarding matching clean events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{CleanEvent, Topic};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and applies them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<CleanEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(clean_event) => {
                        if !subs.matches(clean_event.topic()) {
                            continue;
                        }
                        let Some(json) = event_message(&clean_event) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Wraps a clean event in an `event` envelope.
fn event_message(event: &CleanEvent) -> Option<String> {
    let payload = match serde_json::to_value(event) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(topic = %event.topic(), error = %e, "failed to encode clean event");
            return None;
        }
    };
    let msg = WsMessage::new(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        payload,
    );
    serde_json::to_string(&msg).ok()
}

fn error_message(id: String, code: u16, message: &str) -> Option<String> {
    let err = WsMessage::new(
        id,
        WsMessageType::Error,
        serde_json::json!({ "code": code, "message": message }),
    );
    serde_json::to_string(&err).ok()
}

/// Splits requested names into clean topics, the wildcard flag, and the
/// names that are not subscribable.
fn resolve_topics(names: &[String]) -> (Vec<Topic>, bool, Vec<String>) {
    let mut topics = Vec::new();
    let mut wildcard = false;
    let mut rejected = Vec::new();
    for name in names {
        if name == "*" {
            wildcard = true;
            continue;
        }
        match name.parse::<Topic>() {
            Ok(topic) if topic.is_clean() => topics.push(topic),
            _ => rejected.push(name.clone()),
        }
    }
    (topics, wildcard, rejected)
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error_message(String::new(), 400, "malformed JSON");
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return error_message(msg.id, 404, "unknown command");
    };

    let payload = match command {
        WsCommand::Subscribe { topics } => {
            let (resolved, wildcard, rejected) = resolve_topics(&topics);
            subs.subscribe(&resolved, wildcard);
            serde_json::json!({
                "subscribed": subs.active(),
                "wildcard": subs.is_subscribed_all(),
                "rejected": rejected,
            })
        }
        WsCommand::Unsubscribe { topics } => {
            let (resolved, wildcard, rejected) = resolve_topics(&topics);
            subs.unsubscribe(&resolved, wildcard);
            serde_json::json!({
                "subscribed": subs.active(),
                "wildcard": subs.is_subscribed_all(),
                "rejected": rejected,
            })
        }
    };

    let response = WsMessage::new(msg.id, WsMessageType::Response, payload);
    serde_json::to_string(&response).ok()
}
