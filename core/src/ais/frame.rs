use crate::ais::position::ShipPosition;
use crate::prelude::{Coordinate, NavError, NavResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const POSITION_REPORT: &str = "PositionReport";

/// Rectangular subscription area, stored as south/west/north/east edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Southern Red Sea, 12.3N 42.0E to 19.5N 46.0E.
    pub const SOUTHERN_RED_SEA: BoundingBox = BoundingBox {
        south: 12.3,
        west: 42.0,
        north: 19.5,
        east: 46.0,
    };

    /// Upstream wire order: `[[lon_sw, lat_sw], [lon_ne, lat_ne]]`.
    pub fn to_wire(&self) -> [[f64; 2]; 2] {
        [[self.west, self.south], [self.east, self.north]]
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.south..=self.north).contains(&coordinate.lat)
            && (self.west..=self.east).contains(&coordinate.lon)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn validate(&self) -> NavResult<()> {
        Coordinate::validated(self.south, self.west)?;
        Coordinate::validated(self.north, self.east)?;
        if self.south >= self.north || self.west >= self.east {
            return Err(NavError::InvalidCoordinate {
                lat: self.north,
                lon: self.east,
            });
        }
        Ok(())
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::SOUTHERN_RED_SEA
    }
}

/// Subscription message sent once the upstream socket opens.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    #[serde(rename = "APIKey")]
    pub api_key: String,
    #[serde(rename = "BoundingBoxes")]
    pub bounding_boxes: Vec<[[f64; 2]; 2]>,
}

impl Subscription {
    pub fn new(api_key: impl Into<String>, area: &BoundingBox) -> Self {
        Self {
            api_key: api_key.into(),
            bounding_boxes: vec![area.to_wire()],
        }
    }
}

/// Why an upstream frame was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NotPositionReport,
    MissingPosition,
    MissingMmsi,
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Forward(ShipPosition),
    Drop(DropReason),
}

#[derive(Debug, Deserialize)]
struct UpstreamFrame {
    #[serde(rename = "MessageType")]
    message_type: Option<String>,
    #[serde(rename = "Message")]
    message: Option<UpstreamMessage>,
    #[serde(rename = "MetaData")]
    metadata: Option<UpstreamMetadata>,
}

#[derive(Debug, Deserialize)]
struct UpstreamMessage {
    #[serde(rename = "PositionReport")]
    position_report: Option<UpstreamPositionReport>,
}

#[derive(Debug, Deserialize)]
struct UpstreamPositionReport {
    #[serde(rename = "Latitude")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    longitude: Option<f64>,
    #[serde(rename = "Cog")]
    cog: Option<f64>,
    #[serde(rename = "Sog")]
    sog: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UpstreamMetadata {
    #[serde(rename = "MMSI")]
    mmsi: Option<u64>,
    #[serde(rename = "ShipType")]
    ship_type: Option<Value>,
    #[serde(rename = "ShipName")]
    ship_name: Option<String>,
    time_utc: Option<String>,
}

/// Reduces one upstream provider frame to a forwardable ship position.
///
/// Only `PositionReport` frames with an MMSI and an in-range latitude and
/// longitude are forwarded. The provider reports unavailable positions as
/// 91/181, which the range check drops. Text that is not a JSON object is an
/// error, never a panic.
pub fn filter_frame(text: &str) -> NavResult<FrameOutcome> {
    let frame: UpstreamFrame =
        serde_json::from_str(text).map_err(|err| NavError::MalformedFrame(err.to_string()))?;

    if frame.message_type.as_deref() != Some(POSITION_REPORT) {
        return Ok(FrameOutcome::Drop(DropReason::NotPositionReport));
    }
    let Some(report) = frame.message.and_then(|message| message.position_report) else {
        return Ok(FrameOutcome::Drop(DropReason::NotPositionReport));
    };
    let (Some(lat), Some(lon)) = (report.latitude, report.longitude) else {
        return Ok(FrameOutcome::Drop(DropReason::MissingPosition));
    };
    if Coordinate::validated(lat, lon).is_err() {
        return Ok(FrameOutcome::Drop(DropReason::OutOfRange));
    }

    let metadata = frame.metadata;
    let Some(mmsi) = metadata.as_ref().and_then(|meta| meta.mmsi) else {
        return Ok(FrameOutcome::Drop(DropReason::MissingMmsi));
    };
    let (ship_type, name, timestamp) = match metadata {
        Some(meta) => (
            meta.ship_type
                .as_ref()
                .and_then(Value::as_u64)
                .and_then(|value| u32::try_from(value).ok()),
            meta.ship_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            meta.time_utc,
        ),
        None => (None, None, None),
    };

    Ok(FrameOutcome::Forward(ShipPosition {
        mmsi,
        lat,
        lon,
        cog: report.cog.unwrap_or_default(),
        sog: report.sog.unwrap_or_default(),
        ship_type,
        name,
        timestamp,
    }))
}
