//! # fuel-pipeline
//!
//! Streaming clean-combine-persist pipeline for fuel station and price
//! telemetry.
//!
//! Raw station and price messages arrive one JSON object at a time. Each is
//! validated; stations populate an in-memory directory and durable storage,
//! prices pass a monotonic staleness watermark, are stored, and are joined
//! with their station. Every accepted record is republished on a clean
//! topic.
//!
//! ## Architecture
//!
//! ```text
//! Publishers (HTTP POST raw.station / raw.price)
//!     │
//!     ├── Ingest Handlers (api/)
//!     │
//!     ├── Pipeline (service/)
//!     │     ├── Validator, Watermark (domain/)
//!     │     ├── StationDirectory, Combiner (domain/)
//!     │     └── PersistenceLayer, AuditLog (persistence/)
//!     │
//!     ├── EventBus (domain/)  clean.station / clean.price / clean.combined
//!     │
//!     └── WS Subscribers (ws/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
