//! Map commands proposed by the assistant.
//!
//! Replies are parsed into [`MapCommand`] and validated against the current
//! marker list before anything touches application state.

use crate::markers::model::{Marker, MarkerDraft, Severity};
use crate::prelude::{extract_json_object, Coordinate, NavError, NavResult};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// Marker as proposed by the assistant. Coordinates are `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedMarker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl ProposedMarker {
    /// Fills the blanks the assistant left and validates the result.
    pub fn to_draft(&self) -> NavResult<MarkerDraft> {
        let coordinate = Coordinate::from_lon_lat(self.coordinates)?;
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let draft = MarkerDraft {
            name: non_blank(&self.name).unwrap_or_else(|| "New marker".into()),
            kind: non_blank(&self.kind).unwrap_or_else(|| "military".into()),
            subtype: self.subtype.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            icon: non_blank(&self.icon).unwrap_or_else(|| "🎯".into()),
            coordinate,
            severity: self.severity.unwrap_or(Severity::Medium),
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// Tagged command language returned by the chat proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MapCommand {
    Add {
        marker: ProposedMarker,
        #[serde(default)]
        message: String,
    },
    Move {
        #[serde(rename = "markerId", deserialize_with = "marker_id")]
        marker_id: u64,
        #[serde(rename = "newCoordinates")]
        new_coordinates: [f64; 2],
        #[serde(default)]
        message: String,
    },
    SearchAndAdd {
        markers: Vec<ProposedMarker>,
        #[serde(default)]
        summary: String,
        #[serde(default)]
        message: String,
    },
    Message {
        message: String,
    },
}

impl MapCommand {
    /// Strict parse: the reply must contain a JSON object naming a known action.
    pub fn parse(reply: &str) -> NavResult<Self> {
        let object = extract_json_object(reply)
            .ok_or_else(|| NavError::MalformedCommand("no JSON object in reply".into()))?;
        serde_json::from_str(object).map_err(|err| NavError::MalformedCommand(err.to_string()))
    }

    /// Lenient parse: anything that is not a well-formed command becomes a
    /// plain message carrying the raw reply.
    pub fn from_reply(reply: &str) -> Self {
        match Self::parse(reply) {
            Ok(command) => command,
            Err(err) => {
                if extract_json_object(reply).is_some() {
                    warn!("assistant reply rejected as command: {}", err);
                }
                MapCommand::Message {
                    message: reply.trim().to_string(),
                }
            }
        }
    }

    /// Checks coordinates and referenced ids against `markers`.
    ///
    /// `SearchAndAdd` entries are checked one by one when applied, so a single
    /// bad entry does not sink the batch.
    pub fn validate(&self, markers: &[Marker]) -> NavResult<()> {
        match self {
            MapCommand::Add { marker, .. } => marker.to_draft().map(|_| ()),
            MapCommand::Move {
                marker_id,
                new_coordinates,
                ..
            } => {
                Coordinate::from_lon_lat(*new_coordinates)?;
                if markers.iter().any(|marker| marker.id == *marker_id) {
                    Ok(())
                } else {
                    Err(NavError::UnknownMarker(*marker_id))
                }
            }
            MapCommand::SearchAndAdd { .. } | MapCommand::Message { .. } => Ok(()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MapCommand::Add { message, .. }
            | MapCommand::Move { message, .. }
            | MapCommand::SearchAndAdd { message, .. }
            | MapCommand::Message { message } => message,
        }
    }
}

/// Assistants send marker ids either as numbers or as numeric strings.
fn marker_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(id) => Ok(id),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("marker id {text:?} is not numeric"))),
    }
}
