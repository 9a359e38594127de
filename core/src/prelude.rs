use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Builds a coordinate and rejects non-finite or out-of-range values.
    pub fn validated(lat: f64, lon: f64) -> NavResult<Self> {
        let coordinate = Self::new(lat, lon);
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Reads a GeoJSON-ordered `[lon, lat]` pair.
    pub fn from_lon_lat(pair: [f64; 2]) -> NavResult<Self> {
        Self::validated(pair[1], pair[0])
    }

    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn validate(&self) -> NavResult<()> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lon_ok = self.lon.is_finite() && (-180.0..=180.0).contains(&self.lon);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(NavError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

/// Common error type for the domain model.
#[derive(thiserror::Error, Debug)]
pub enum NavError {
    #[error("invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("invalid speed: {0} knots")]
    InvalidSpeed(f64),
    #[error("invalid distance: {0} km")]
    InvalidDistance(f64),
    #[error("invalid zone radius: {0} m")]
    InvalidRadius(f64),
    #[error("invalid marker: {0}")]
    InvalidMarker(String),
    #[error("invalid icon: {0}")]
    InvalidIcon(String),
    #[error("unknown marker id {0}")]
    UnknownMarker(u64),
    #[error("id space exhausted after {0}")]
    IdsExhausted(u64),
    #[error("unknown voyage id {0}")]
    UnknownVoyage(String),
    #[error("malformed command: {0}")]
    MalformedCommand(String),
    #[error("empty search query")]
    EmptyQuery,
    #[error("malformed AIS frame: {0}")]
    MalformedFrame(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type NavResult<T> = Result<T, NavError>;

/// Wall-clock millisecond ids that never repeat within one sequence.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure ids already in use are never handed out again.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }

    pub fn next(&mut self) -> NavResult<u64> {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let following = self
            .last
            .checked_add(1)
            .ok_or(NavError::IdsExhausted(self.last))?;
        let id = now.max(following);
        self.last = id;
        Ok(id)
    }
}

/// Returns the first-`{`-to-last-`}` slice of a free-text model reply.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_out_of_range_values() {
        assert!(Coordinate::validated(90.0, 180.0).is_ok());
        assert!(Coordinate::validated(90.5, 0.0).is_err());
        assert!(Coordinate::validated(0.0, -181.0).is_err());
        assert!(Coordinate::validated(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn lon_lat_pairs_are_swapped_into_place() {
        let coordinate = Coordinate::from_lon_lat([39.152, 21.5433]).unwrap();
        assert_eq!(coordinate.lat, 21.5433);
        assert_eq!(coordinate.to_lon_lat(), [39.152, 21.5433]);
    }

    #[test]
    fn id_sequence_is_strictly_increasing() {
        let mut ids = IdSequence::new();
        let first = ids.next().unwrap();
        let second = ids.next().unwrap();
        assert!(second > first);

        ids.observe(u64::MAX - 10);
        assert_eq!(ids.next().unwrap(), u64::MAX - 9);
    }

    #[test]
    fn id_sequence_refuses_to_wrap_around() {
        let mut ids = IdSequence::new();
        ids.observe(u64::MAX);
        assert!(matches!(ids.next(), Err(NavError::IdsExhausted(u64::MAX))));
        assert!(ids.next().is_err());
    }

    #[test]
    fn json_object_is_extracted_from_prose() {
        let reply = "Sure! {\"action\": \"message\", \"message\": \"hi\"} Anything else?";
        assert_eq!(
            extract_json_object(reply),
            Some("{\"action\": \"message\", \"message\": \"hi\"}")
        );
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }
}
