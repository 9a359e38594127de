use navmapcore::markers::model::{MarkerDraft, Severity};
use navmapcore::news::NewsQuery;
use navmapcore::state::CustomIcon;
use navmapcore::tracking::{MarkerFilter, OperationZone, ShipFilter};
use navmapcore::voyage::{RoutePlan, DEFAULT_SPEED_KNOTS};
use navmapcore::Coordinate;

/// AIS ship type groups offered as filter toggles, keyed by the first code
/// of each ten-code block.
pub const SHIP_TYPE_GROUPS: [(&str, u32); 6] = [
    ("Fishing", 30),
    ("High speed", 40),
    ("Pilot & SAR", 50),
    ("Passenger", 60),
    ("Cargo", 70),
    ("Tanker", 80),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    MarkerName,
    MarkerKind,
    MarkerIcon,
    MarkerDescription,
    MarkerLat,
    MarkerLng,
    MarkerSearch,
    ZoneLat,
    ZoneLon,
    ZoneRadiusKm,
    RouteFromLat,
    RouteFromLon,
    RouteToLat,
    RouteToLon,
    RouteSpeed,
    MinSpeed,
    MaxSpeed,
    Chat,
    NewsQuery,
    NewsStart,
    NewsEnd,
    IconLabel,
    IconData,
    MapboxToken,
}

/// Raw text of every input on the console.
#[derive(Debug, Clone)]
pub struct Forms {
    pub marker_name: String,
    pub marker_kind: String,
    pub marker_icon: String,
    pub marker_description: String,
    pub marker_lat: String,
    pub marker_lng: String,
    pub marker_severity: Severity,
    pub editing: Option<u64>,
    pub marker_search: String,
    pub marker_types: Vec<String>,
    pub marker_severities: Vec<Severity>,
    pub zone_lat: String,
    pub zone_lon: String,
    pub zone_radius_km: String,
    pub route_from_lat: String,
    pub route_from_lon: String,
    pub route_to_lat: String,
    pub route_to_lon: String,
    pub route_speed: String,
    pub min_speed: String,
    pub max_speed: String,
    pub ship_types: Vec<u32>,
    pub chat: String,
    pub news_query: String,
    pub news_start: String,
    pub news_end: String,
    pub icon_label: String,
    pub icon_data: String,
    pub mapbox_token: String,
}

impl Forms {
    pub fn new(zone: &OperationZone) -> Self {
        let draft = MarkerDraft::default();
        let filter = ShipFilter::default();
        Self {
            marker_name: String::new(),
            marker_kind: draft.kind.clone(),
            marker_icon: "🚢".into(),
            marker_description: String::new(),
            marker_lat: draft.coordinate.lat.to_string(),
            marker_lng: draft.coordinate.lon.to_string(),
            marker_severity: draft.severity,
            editing: None,
            marker_search: String::new(),
            marker_types: Vec::new(),
            marker_severities: Vec::new(),
            zone_lat: zone.center.lat.to_string(),
            zone_lon: zone.center.lon.to_string(),
            zone_radius_km: (zone.radius_m / 1000.0).to_string(),
            route_from_lat: String::new(),
            route_from_lon: String::new(),
            route_to_lat: String::new(),
            route_to_lon: String::new(),
            route_speed: DEFAULT_SPEED_KNOTS.to_string(),
            min_speed: filter.min_speed.to_string(),
            max_speed: filter.max_speed.to_string(),
            ship_types: filter.types,
            chat: String::new(),
            news_query: String::new(),
            news_start: String::new(),
            news_end: String::new(),
            icon_label: String::new(),
            icon_data: String::new(),
            mapbox_token: String::new(),
        }
    }

    pub fn update_field(&mut self, field: Field, value: String) {
        match field {
            Field::MarkerName => self.marker_name = value,
            Field::MarkerKind => self.marker_kind = value,
            Field::MarkerIcon => self.marker_icon = value,
            Field::MarkerDescription => self.marker_description = value,
            Field::MarkerLat => self.marker_lat = value,
            Field::MarkerLng => self.marker_lng = value,
            Field::MarkerSearch => self.marker_search = value,
            Field::ZoneLat => self.zone_lat = value,
            Field::ZoneLon => self.zone_lon = value,
            Field::ZoneRadiusKm => self.zone_radius_km = value,
            Field::RouteFromLat => self.route_from_lat = value,
            Field::RouteFromLon => self.route_from_lon = value,
            Field::RouteToLat => self.route_to_lat = value,
            Field::RouteToLon => self.route_to_lon = value,
            Field::RouteSpeed => self.route_speed = value,
            Field::MinSpeed => self.min_speed = value,
            Field::MaxSpeed => self.max_speed = value,
            Field::Chat => self.chat = value,
            Field::NewsQuery => self.news_query = value,
            Field::NewsStart => self.news_start = value,
            Field::NewsEnd => self.news_end = value,
            Field::IconLabel => self.icon_label = value,
            Field::IconData => self.icon_data = value,
            Field::MapboxToken => self.mapbox_token = value,
        }
    }

    pub fn cycle_severity(&mut self) {
        self.marker_severity = match self.marker_severity {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High => Severity::Low,
        };
    }

    /// Selecting any code of a group counts as selecting the group; toggling
    /// a selected group removes all of its codes.
    pub fn toggle_ship_group(&mut self, first_code: u32) {
        let group = first_code..=first_code + 9;
        if self.ship_group_selected(first_code) {
            self.ship_types.retain(|code| !group.contains(code));
        } else {
            self.ship_types.extend(group);
        }
    }

    pub fn ship_group_selected(&self, first_code: u32) -> bool {
        let group = first_code..=first_code + 9;
        self.ship_types.iter().any(|code| group.contains(code))
    }

    pub fn toggle_marker_type(&mut self, kind: &str) {
        if let Some(index) = self.marker_types.iter().position(|t| t == kind) {
            self.marker_types.remove(index);
        } else {
            self.marker_types.push(kind.to_string());
        }
    }

    pub fn toggle_marker_severity(&mut self, severity: Severity) {
        if let Some(index) = self.marker_severities.iter().position(|s| *s == severity) {
            self.marker_severities.remove(index);
        } else {
            self.marker_severities.push(severity);
        }
    }

    pub fn marker_filter(&self) -> MarkerFilter {
        MarkerFilter {
            search: self.marker_search.clone(),
            types: self.marker_types.clone(),
            severities: self.marker_severities.clone(),
        }
    }

    pub fn custom_icon(&self) -> Result<CustomIcon, String> {
        CustomIcon::new(&self.icon_label, &self.icon_data).map_err(|err| err.to_string())
    }

    pub fn clear_icon(&mut self) {
        self.icon_label.clear();
        self.icon_data.clear();
    }

    pub fn load_marker(&mut self, id: u64, draft: &MarkerDraft) {
        self.editing = Some(id);
        self.marker_name = draft.name.clone();
        self.marker_kind = draft.kind.clone();
        self.marker_icon = draft.icon.clone();
        self.marker_description = draft.description.clone();
        self.marker_lat = draft.coordinate.lat.to_string();
        self.marker_lng = draft.coordinate.lon.to_string();
        self.marker_severity = draft.severity;
    }

    pub fn clear_marker(&mut self) {
        self.editing = None;
        self.marker_name.clear();
        self.marker_description.clear();
    }

    pub fn marker_draft(&self) -> Result<MarkerDraft, String> {
        let coordinate = parse_coordinate(&self.marker_lat, &self.marker_lng)?;
        let mut draft =
            MarkerDraft::new(self.marker_name.trim(), self.marker_kind.trim(), coordinate);
        draft.icon = self.marker_icon.trim().to_string();
        draft.description = self.marker_description.trim().to_string();
        draft.severity = self.marker_severity;
        draft.validate().map_err(|err| err.to_string())?;
        Ok(draft)
    }

    /// Radius is typed in kilometers and stored in meters.
    pub fn zone(&self) -> Result<OperationZone, String> {
        let center = parse_coordinate(&self.zone_lat, &self.zone_lon)?;
        let radius_km = parse_number("radius", &self.zone_radius_km)?;
        OperationZone::new(center, radius_km * 1000.0).map_err(|err| err.to_string())
    }

    pub fn route(&self) -> Result<RoutePlan, String> {
        let from = parse_coordinate(&self.route_from_lat, &self.route_from_lon)?;
        let to = parse_coordinate(&self.route_to_lat, &self.route_to_lon)?;
        let speed = if self.route_speed.trim().is_empty() {
            DEFAULT_SPEED_KNOTS
        } else {
            parse_number("speed", &self.route_speed)?
        };
        RoutePlan::compute(from, to, speed).map_err(|err| err.to_string())
    }

    /// Unparseable bounds fall back to the default window.
    pub fn ship_filter(&self) -> ShipFilter {
        let defaults = ShipFilter::default();
        ShipFilter {
            min_speed: self.min_speed.trim().parse().unwrap_or(defaults.min_speed),
            max_speed: self.max_speed.trim().parse().unwrap_or(defaults.max_speed),
            types: self.ship_types.clone(),
        }
    }

    pub fn news_query(&self) -> Result<NewsQuery, String> {
        if self.news_query.trim().is_empty() {
            return Err("enter a search query".into());
        }
        Ok(NewsQuery {
            query: self.news_query.trim().to_string(),
            start_date: self.news_start.trim().to_string(),
            end_date: self.news_end.trim().to_string(),
        })
    }
}

fn parse_number(label: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{label} must be a number, got {value:?}"))
}

pub fn parse_coordinate(lat: &str, lon: &str) -> Result<Coordinate, String> {
    let lat = parse_number("latitude", lat)?;
    let lon = parse_number("longitude", lon)?;
    Coordinate::validated(lat, lon).map_err(|err| err.to_string())
}
