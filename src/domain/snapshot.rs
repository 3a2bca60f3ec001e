// Current price per station
use super::sample::parse_value;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Available(f64),
    Unavailable,
}

impl Price {
    /// Parse a state value such as "1.829" or "unknown".
    pub fn from_state(state: &str) -> Self {
        match parse_value(state) {
            Some(v) => Price::Available(v),
            None => Price::Unavailable,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Price::Available(v) => Some(*v),
            Price::Unavailable => None,
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub station_id: String,
    pub display_name: Option<String>,
    pub price: Price,
    pub logo: Option<String>,
}

impl PriceSnapshot {
    pub fn new(
        station_id: String,
        display_name: Option<String>,
        price: Price,
        logo: Option<String>,
    ) -> Self {
        Self {
            station_id,
            display_name,
            price,
            logo,
        }
    }

    /// Snapshot for a station the state source could not describe.
    pub fn unavailable(station_id: impl Into<String>) -> Self {
        Self::new(station_id.into(), None, Price::Unavailable, None)
    }

    /// Display name, falling back to the station id.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.station_id)
    }
}
