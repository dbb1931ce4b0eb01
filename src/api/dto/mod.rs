//! Data Transfer Objects for REST responses.
//!
//! Ingest outcomes are serialized directly from
//! [`crate::service::StationOutcome`] and [`crate::service::PriceOutcome`].

pub mod status_dto;

pub use status_dto::*;
