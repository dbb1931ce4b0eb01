//! Logical bus topics.
//!
//! [`Topic`] names the two raw inbound channels and the three clean
//! outbound channels. The wire names (e.g. `"raw.price"`) are what the
//! transport exposes; inside the crate topics are always this enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A logical publish/subscribe channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Raw station observations from the upstream publisher.
    #[serde(rename = "raw.station")]
    RawStation,
    /// Raw price observations from the upstream publisher.
    #[serde(rename = "raw.price")]
    RawPrice,
    /// Validated station records.
    #[serde(rename = "clean.station")]
    CleanStation,
    /// Validated, non-stale price records.
    #[serde(rename = "clean.price")]
    CleanPrice,
    /// Price records joined with their station.
    #[serde(rename = "clean.combined")]
    CleanCombined,
}

impl Topic {
    /// The outbound topics a subscriber may listen to.
    pub const CLEAN: [Self; 3] = [Self::CleanStation, Self::CleanPrice, Self::CleanCombined];

    /// Returns the wire name of the topic.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RawStation => "raw.station",
            Self::RawPrice => "raw.price",
            Self::CleanStation => "clean.station",
            Self::CleanPrice => "clean.price",
            Self::CleanCombined => "clean.combined",
        }
    }

    /// Returns `true` for the outbound `clean.*` topics.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(
            self,
            Self::CleanStation | Self::CleanPrice | Self::CleanCombined
        )
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known topic name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw.station" => Ok(Self::RawStation),
            "raw.price" => Ok(Self::RawPrice),
            "clean.station" => Ok(Self::CleanStation),
            "clean.price" => Ok(Self::CleanPrice),
            "clean.combined" => Ok(Self::CleanCombined),
            other => Err(UnknownTopic(other.to_string())),
        }
    }
}
