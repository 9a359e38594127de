//! Marker exports: GeoJSON, CSV and KML.

use crate::markers::model::Marker;
use crate::prelude::{NavError, NavResult};
use serde_json::{json, Value};

const UTF8_BOM: &str = "\u{feff}";

pub fn to_geojson(markers: &[Marker]) -> Value {
    let features: Vec<Value> = markers
        .iter()
        .map(|marker| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [marker.lng, marker.lat],
                },
                "properties": {
                    "id": marker.id,
                    "name": marker.name,
                    "type": marker.kind,
                    "subtype": marker.subtype,
                    "description": marker.description,
                    "icon": marker.icon,
                    "severity": marker.severity,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// CSV prefixed with a UTF-8 BOM so spreadsheet tools pick the right
/// encoding for Arabic names.
pub fn to_csv(markers: &[Marker]) -> NavResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "name",
            "type",
            "subtype",
            "description",
            "icon",
            "lat",
            "lng",
            "severity",
        ])
        .map_err(csv_error)?;
    for marker in markers {
        writer
            .write_record([
                marker.id.to_string(),
                marker.name.clone(),
                marker.kind.clone(),
                marker.subtype.clone(),
                marker.description.clone(),
                marker.icon.clone(),
                marker.lat.to_string(),
                marker.lng.to_string(),
                marker.severity.to_string(),
            ])
            .map_err(csv_error)?;
    }
    let bytes = writer.into_inner().map_err(|err| {
        NavError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            err.to_string(),
        ))
    })?;
    let body = String::from_utf8(bytes)
        .map_err(|err| NavError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;
    Ok(format!("{UTF8_BOM}{body}"))
}

fn csv_error(err: csv::Error) -> NavError {
    NavError::Io(err.into())
}

pub fn to_kml(markers: &[Marker]) -> String {
    let mut kml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n<Document>\n<name>NavMap markers</name>\n",
    );
    for marker in markers {
        kml.push_str(&format!(
            "<Placemark>\n<name>{}</name>\n<description>{}</description>\n\
<ExtendedData>\n<Data name=\"type\"><value>{}</value></Data>\n\
<Data name=\"severity\"><value>{}</value></Data>\n</ExtendedData>\n\
<Point><coordinates>{},{},0</coordinates></Point>\n</Placemark>\n",
            xml_escape(&marker.name),
            xml_escape(&marker.description),
            xml_escape(&marker.kind),
            marker.severity,
            marker.lng,
            marker.lat,
        ));
    }
    kml.push_str("</Document>\n</kml>\n");
    kml
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::model::{MarkerDraft, Severity};
    use crate::prelude::Coordinate;

    fn markers() -> Vec<Marker> {
        let mut draft = MarkerDraft::new("قاعدة <north> & co", "base", Coordinate::new(21.5, 39.1));
        draft.description = "says \"hi\", twice".into();
        draft.severity = Severity::High;
        vec![draft.into_marker(1)]
    }

    #[test]
    fn geojson_uses_lon_lat_order() {
        let value = to_geojson(&markers());
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(
            value["features"][0]["geometry"]["coordinates"],
            json!([39.1, 21.5])
        );
        assert_eq!(value["features"][0]["properties"]["severity"], "high");
    }

    #[test]
    fn csv_starts_with_bom_and_quotes_fields() {
        let csv = to_csv(&markers()).unwrap();
        assert!(csv.starts_with('\u{feff}'));
        let mut lines = csv.trim_start_matches('\u{feff}').lines();
        assert_eq!(
            lines.next(),
            Some("id,name,type,subtype,description,icon,lat,lng,severity")
        );
        assert!(lines
            .next()
            .unwrap()
            .contains("\"says \"\"hi\"\", twice\""));
    }

    #[test]
    fn kml_escapes_markup() {
        let kml = to_kml(&markers());
        assert!(kml.contains("&lt;north&gt; &amp; co"));
        assert!(kml.contains("<coordinates>39.1,21.5,0</coordinates>"));
    }
}
