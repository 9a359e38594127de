use crate::prelude::{Coordinate, NavError, NavResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Threat tier shown as the marker ring colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user or assistant placed map point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: u64,
    #[serde(alias = "name_ar")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default, alias = "description_ar")]
    pub description: String,
    pub icon: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub severity: Severity,
}

impl Marker {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Editable marker fields, shared by create and edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDraft {
    pub name: String,
    pub kind: String,
    pub subtype: String,
    pub description: String,
    pub icon: String,
    pub coordinate: Coordinate,
    pub severity: Severity,
}

impl MarkerDraft {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, coordinate: Coordinate) -> Self {
        let kind = kind.into();
        Self {
            name: name.into(),
            icon: kind.clone(),
            kind,
            subtype: String::new(),
            description: String::new(),
            coordinate,
            severity: Severity::Low,
        }
    }

    pub fn validate(&self) -> NavResult<()> {
        if self.name.trim().is_empty() {
            return Err(NavError::InvalidMarker("name is required".into()));
        }
        if self.icon.trim().is_empty() {
            return Err(NavError::InvalidMarker("icon is required".into()));
        }
        if self.kind.trim().is_empty() {
            return Err(NavError::InvalidMarker("type is required".into()));
        }
        self.coordinate.validate()
    }

    pub fn into_marker(self, id: u64) -> Marker {
        Marker {
            id,
            name: self.name.trim().to_string(),
            kind: self.kind,
            subtype: self.subtype,
            description: self.description,
            icon: self.icon,
            lat: self.coordinate.lat,
            lng: self.coordinate.lon,
            severity: self.severity,
        }
    }
}

impl Default for MarkerDraft {
    /// Empty ship marker positioned off Jeddah.
    fn default() -> Self {
        Self::new("", "ship", Coordinate::new(21.5433, 39.1520))
    }
}

impl From<&Marker> for MarkerDraft {
    fn from(marker: &Marker) -> Self {
        Self {
            name: marker.name.clone(),
            kind: marker.kind.clone(),
            subtype: marker.subtype.clone(),
            description: marker.description.clone(),
            icon: marker.icon.clone(),
            coordinate: marker.coordinate(),
            severity: marker.severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_a_name_and_valid_position() {
        let mut draft = MarkerDraft::default();
        assert!(matches!(draft.validate(), Err(NavError::InvalidMarker(_))));

        draft.name = "Harbour patrol".into();
        assert!(draft.validate().is_ok());

        draft.coordinate = Coordinate::new(95.0, 39.0);
        assert!(matches!(
            draft.validate(),
            Err(NavError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let marker: Marker = serde_json::from_str(
            r#"{"id": 5, "name_ar": "Base", "type": "military", "description_ar": "d",
                "icon": "anchor", "lat": 21.5, "lng": 39.1}"#,
        )
        .unwrap();
        assert_eq!(marker.name, "Base");
        assert_eq!(marker.severity, Severity::Low);
    }
}
