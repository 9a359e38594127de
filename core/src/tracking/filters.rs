use crate::ais::position::ShipPosition;
use crate::markers::model::{Marker, Severity};
use serde::{Deserialize, Serialize};

/// Ship list filter: AIS ship types and a speed-over-ground window in knots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipFilter {
    /// Empty means every type. Ships that report no type always pass.
    pub types: Vec<u32>,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl Default for ShipFilter {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            min_speed: 0.0,
            max_speed: 50.0,
        }
    }
}

impl ShipFilter {
    pub fn matches(&self, ship: &ShipPosition) -> bool {
        if let Some(ship_type) = ship.ship_type {
            if !self.types.is_empty() && !self.types.contains(&ship_type) {
                return false;
            }
        }
        ship.sog >= self.min_speed && ship.sog <= self.max_speed
    }
}

/// Marker list filter used by the sidebar search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerFilter {
    pub search: String,
    pub types: Vec<String>,
    pub severities: Vec<Severity>,
}

impl MarkerFilter {
    pub fn matches(&self, marker: &Marker) -> bool {
        let term = self.search.trim().to_lowercase();
        let text_ok = term.is_empty()
            || marker.name.to_lowercase().contains(&term)
            || marker.description.to_lowercase().contains(&term);
        let type_ok = self.types.is_empty() || self.types.iter().any(|kind| kind == &marker.kind);
        let severity_ok = self.severities.is_empty() || self.severities.contains(&marker.severity);
        text_ok && type_ok && severity_ok
    }
}
