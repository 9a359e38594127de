use crate::prelude::Coordinate;
use serde::{Deserialize, Serialize};

/// Ship position forwarded by the relay, one JSON object per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipPosition {
    pub mmsi: u64,
    pub lat: f64,
    pub lon: f64,
    /// Course over ground, degrees.
    #[serde(default)]
    pub cog: f64,
    /// Speed over ground, knots.
    #[serde(default)]
    pub sog: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ShipPosition {
    pub fn new(mmsi: u64, lat: f64, lon: f64) -> Self {
        Self {
            mmsi,
            lat,
            lon,
            cog: 0.0,
            sog: 0.0,
            ship_type: None,
            name: None,
            timestamp: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Name when known, otherwise the MMSI.
    pub fn label(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("MMSI: {}", self.mmsi),
        }
    }
}
