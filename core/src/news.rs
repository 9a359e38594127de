use crate::ais::frame::BoundingBox;
use crate::markers::model::Severity;
use crate::prelude::{extract_json_object, Coordinate, NavError, NavResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// News search request posted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsQuery {
    pub query: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}

/// A geolocated maritime or military event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub severity: Severity,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl NewsEvent {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsReport {
    pub events: Vec<NewsEvent>,
}

impl NewsReport {
    /// Parses the model reply. Events with impossible coordinates are dropped.
    pub fn from_reply(reply: &str) -> NavResult<Self> {
        let object = extract_json_object(reply).unwrap_or(reply);
        let mut report: NewsReport = serde_json::from_str(object)?;
        let before = report.events.len();
        report
            .events
            .retain(|event| event.coordinate().validate().is_ok());
        if report.events.len() < before {
            warn!(
                "dropped {} news events with invalid coordinates",
                before - report.events.len()
            );
        }
        Ok(report)
    }
}

pub const NEWS_SYSTEM_PROMPT: &str = "You are an assistant specialised in maritime and military \
events. Always answer with valid JSON only, without any additional text.";

/// User prompt asking the model for events inside `area`.
pub fn build_search_prompt(query: &NewsQuery, area: &BoundingBox) -> NavResult<String> {
    area.validate()?;
    if query.query.trim().is_empty() {
        return Err(NavError::EmptyQuery);
    }
    Ok(format!(
        "Find significant maritime and military events between {start} and {end} related to: \
{query}.\n\n\
Return the results strictly as JSON in this shape only:\n\
{{\n  \"events\": [\n    {{\n      \"title\": \"event title\",\n      \
\"description\": \"short description\",\n      \"date\": \"ISO date\",\n      \
\"lat\": latitude (number between {south} and {north}),\n      \
\"lon\": longitude (number between {west} and {east}),\n      \
\"severity\": \"high, medium or low\",\n      \"type\": \"event type\"\n    }}\n  ]\n}}\n\n\
Keep every coordinate inside {south}N-{north}N, {west}E-{east}E. If the exact location is \
unknown, use approximate coordinates near {center_lat:.2}N {center_lon:.2}E.",
        start = query.start_date,
        end = query.end_date,
        query = query.query.trim(),
        south = area.south,
        north = area.north,
        west = area.west,
        east = area.east,
        center_lat = area.center().lat,
        center_lon = area.center().lon,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str) -> NewsQuery {
        NewsQuery {
            query: text.into(),
            start_date: "2025-01-01".into(),
            end_date: "2025-01-31".into(),
        }
    }

    #[test]
    fn report_is_extracted_and_sanitized() {
        let reply = r#"Results: {"events": [
            {"title": "Drone sighting", "description": "d", "date": "2025-01-02",
             "lat": 14.8, "lon": 42.9, "severity": "high", "type": "air"},
            {"title": "Bad", "lat": 140.0, "lon": 42.9}
        ]}"#;
        let report = NewsReport::from_reply(reply).unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].severity, Severity::High);
        assert_eq!(report.events[0].kind, "air");
    }

    #[test]
    fn non_json_reply_is_an_error() {
        assert!(NewsReport::from_reply("I could not find anything").is_err());
    }

    #[test]
    fn prompt_mentions_dates_and_bounds() {
        let prompt = build_search_prompt(&query("mines"), &BoundingBox::SOUTHERN_RED_SEA).unwrap();
        assert!(prompt.contains("2025-01-01"));
        assert!(prompt.contains("mines"));
        assert!(prompt.contains("12.3N-19.5N"));
    }

    #[test]
    fn blank_query_is_rejected() {
        assert!(matches!(
            build_search_prompt(&query("  "), &BoundingBox::default()),
            Err(NavError::EmptyQuery)
        ));
    }
}
