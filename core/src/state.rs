//! Application state owned by the console, persisted as one JSON document.

use crate::command::MapCommand;
use crate::markers::model::{Marker, MarkerDraft};
use crate::markers::store::MarkerStore;
use crate::prelude::{Coordinate, NavError, NavResult};
use crate::telemetry::log::LogManager;
use crate::tracking::zone::OperationZone;
use crate::voyage::{RoutePlan, Voyage, VoyageLog};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Last map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            lat: 21.5433,
            lng: 39.1520,
            zoom: 11.0,
        }
    }
}

/// User-uploaded marker icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomIcon {
    pub id: String,
    pub label: String,
    /// Data URL or file reference.
    pub data: String,
}

impl CustomIcon {
    /// The id is derived from the label, so re-adding a label replaces it.
    pub fn new(label: &str, data: &str) -> NavResult<Self> {
        let label = label.trim();
        let data = data.trim();
        if data.is_empty() {
            return Err(NavError::InvalidIcon("image data is required".into()));
        }
        let slug = label
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            return Err(NavError::InvalidIcon("a label is required".into()));
        }
        Ok(Self {
            id: format!("custom-{slug}"),
            label: label.to_string(),
            data: data.to_string(),
        })
    }
}


/// What applying an assistant command changed.
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedCommand {
    Added(Marker),
    Moved { id: u64, to: Coordinate },
    Batch { added: Vec<Marker>, skipped: Vec<String> },
    Message(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub markers: MarkerStore,
    pub zone: OperationZone,
    pub view: MapView,
    pub voyages: VoyageLog,
    pub custom_icons: Vec<CustomIcon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapbox_token: Option<String>,
}

impl AppState {
    /// Reads the saved document; a missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> NavResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            LogManager::new("state").record(&format!(
                "no saved state at {}, starting fresh",
                path.display()
            ));
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let state: AppState = serde_json::from_str(&contents)?;
        state.zone.validate()?;
        Ok(state)
    }

    /// Writes through a sibling temp file so a crash never leaves a torn document.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> NavResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&staging, path)?;
        Ok(())
    }

    pub fn add_marker(&mut self, draft: MarkerDraft) -> NavResult<&Marker> {
        self.markers.add(draft)
    }

    pub fn update_marker(&mut self, id: u64, draft: MarkerDraft) -> NavResult<&Marker> {
        self.markers.update(id, draft)
    }

    pub fn delete_marker(&mut self, id: u64) -> NavResult<Marker> {
        self.markers.delete(id)
    }

    pub fn move_marker(&mut self, id: u64, to: Coordinate) -> NavResult<&Marker> {
        self.markers.move_to(id, to)
    }

    pub fn set_zone(&mut self, zone: OperationZone) -> NavResult<()> {
        zone.validate()?;
        self.zone = zone;
        Ok(())
    }

    pub fn set_view(&mut self, view: MapView) -> NavResult<()> {
        Coordinate::validated(view.lat, view.lng)?;
        self.view = view;
        Ok(())
    }

    pub fn record_voyage(&mut self, plan: &RoutePlan) -> NavResult<Voyage> {
        self.voyages.record(plan)
    }

    pub fn delete_voyage(&mut self, id: &str) -> NavResult<()> {
        self.voyages.delete(id)
    }

    pub fn add_custom_icon(&mut self, icon: CustomIcon) {
        self.custom_icons.retain(|existing| existing.id != icon.id);
        self.custom_icons.push(icon);
    }

    /// Display text for a marker icon: the custom icon label when `icon`
    /// names one, otherwise the icon itself.
    pub fn icon_label<'a>(&'a self, icon: &'a str) -> &'a str {
        self.custom_icons
            .iter()
            .find(|custom| custom.id == icon)
            .map_or(icon, |custom| custom.label.as_str())
    }

    /// A blank token clears it.
    pub fn set_mapbox_token(&mut self, token: &str) {
        let token = token.trim();
        self.mapbox_token = (!token.is_empty()).then(|| token.to_string());
    }

    /// Base map credit: Mapbox dark tiles when a token is stored,
    /// OpenStreetMap otherwise.
    pub fn tile_attribution(&self) -> &'static str {
        if self.mapbox_token.is_some() {
            "© Mapbox © OpenStreetMap"
        } else {
            "© OpenStreetMap"
        }
    }

    /// Validates `command` against the current markers, then applies it.
    pub fn apply_command(&mut self, command: MapCommand) -> NavResult<AppliedCommand> {
        command.validate(self.markers.as_slice())?;
        match command {
            MapCommand::Add { marker, .. } => {
                let added = self.markers.add(marker.to_draft()?)?.clone();
                Ok(AppliedCommand::Added(added))
            }
            MapCommand::Move {
                marker_id,
                new_coordinates,
                ..
            } => {
                let to = Coordinate::from_lon_lat(new_coordinates)?;
                self.markers.move_to(marker_id, to)?;
                Ok(AppliedCommand::Moved { id: marker_id, to })
            }
            MapCommand::SearchAndAdd { markers, .. } => {
                let logger = LogManager::new("state");
                let mut added = Vec::new();
                let mut skipped = Vec::new();
                for proposed in markers {
                    let label = proposed.name.clone().unwrap_or_default();
                    match proposed
                        .to_draft()
                        .and_then(|draft| self.markers.add(draft).cloned())
                    {
                        Ok(marker) => added.push(marker),
                        Err(err) => {
                            logger.warn(&format!("skipping proposed marker {label:?}: {err}"));
                            skipped.push(label);
                        }
                    }
                }
                Ok(AppliedCommand::Batch { added, skipped })
            }
            MapCommand::Message { message } => Ok(AppliedCommand::Message(message)),
        }
    }
}
