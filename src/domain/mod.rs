//! Domain layer: records, validation, join state, and the event bus.
//!
//! Everything here is computation-only. The only shared mutable state is
//! the [`StationDirectory`] and the [`Watermark`]; neither is ever held
//! across an `.await`.

pub mod clean_event;
pub mod combined;
pub mod combiner;
pub mod event_bus;
pub mod price;
pub mod station;
pub mod station_directory;
pub mod topic;
pub mod validator;
pub mod watermark;

pub use clean_event::CleanEvent;
pub use combined::CombinedRecord;
pub use combiner::{Combiner, JoinMiss};
pub use event_bus::EventBus;
pub use price::{PriceRecord, RawPrice};
pub use station::{Location, RawStation, StationRecord};
pub use station_directory::StationDirectory;
pub use topic::Topic;
pub use validator::{ValidationError, validate_price, validate_station};
pub use watermark::Watermark;
