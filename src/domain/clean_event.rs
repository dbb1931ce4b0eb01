//! Events re-published after cleaning.
//!
//! Every accepted record is emitted as a [`CleanEvent`] through the
//! [`super::EventBus`]. The event's topic is implied by its variant.

use serde::Serialize;

use super::Topic;
use super::combined::CombinedRecord;
use super::price::PriceRecord;
use super::station::StationRecord;

/// A cleaned record on one of the outbound topics.
///
/// Serializes as `{"topic": "clean.price", "record": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "topic", content = "record")]
pub enum CleanEvent {
    /// A validated station.
    #[serde(rename = "clean.station")]
    Station(StationRecord),
    /// A validated, non-stale price.
    #[serde(rename = "clean.price")]
    Price(PriceRecord),
    /// A price merged with its station.
    #[serde(rename = "clean.combined")]
    Combined(CombinedRecord),
}

impl CleanEvent {
    /// Returns the topic this event is published on.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::Station(_) => Topic::CleanStation,
            Self::Price(_) => Topic::CleanPrice,
            Self::Combined(_) => Topic::CleanCombined,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::price::parse_last_updated;
    use serde_json::json;

    fn price() -> PriceRecord {
        let Ok(last_updated) = parse_last_updated("01/01/2024 10:00:00") else {
            panic!("valid timestamp");
        };
        PriceRecord {
            station_code: "X1".to_string(),
            fuel_type: "U91".to_string(),
            price: 199.9,
            last_updated,
            extra: Default::default(),
        }
    }

    #[test]
    fn topic_follows_variant() {
        assert_eq!(CleanEvent::Price(price()).topic(), Topic::CleanPrice);
    }

    #[test]
    fn serializes_topic_and_record() {
        let event = CleanEvent::Price(price());
        let Ok(value) = serde_json::to_value(&event) else {
            panic!("serialization failed");
        };
        assert_eq!(value["topic"], json!("clean.price"));
        assert_eq!(value["record"]["fueltype"], json!("U91"));
    }
}
