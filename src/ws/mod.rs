//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams the clean topics
//! (`clean.station`, `clean.price`, `clean.combined`) to subscribed
//! clients.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
