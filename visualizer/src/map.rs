use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke, Text},
    Color, Pixels, Point, Rectangle, Renderer, Size, Theme,
};
use navmapcore::ais::ShipPosition;
use navmapcore::markers::model::{Marker, Severity};
use navmapcore::news::NewsEvent;
use navmapcore::state::MapView;
use navmapcore::tracking::OperationZone;
use navmapcore::Coordinate;
use std::collections::HashSet;
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
/// Ground meters per pixel at the equator, zoom 0.
const METERS_PER_PIXEL_Z0: f64 = 156_543.033_92;

/// Web-mercator projection centred on the current map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub center: Coordinate,
    pub zoom: f64,
}

impl Projection {
    pub fn from_view(view: &MapView) -> Self {
        Self {
            center: Coordinate::new(view.lat, view.lng),
            zoom: view.zoom,
        }
    }

    fn world(&self, coordinate: Coordinate) -> (f64, f64) {
        let scale = TILE_SIZE * 2f64.powf(self.zoom);
        let lat = coordinate.lat.clamp(-85.0511, 85.0511).to_radians();
        let x = (coordinate.lon + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
        (x, y)
    }

    pub fn to_screen(&self, coordinate: Coordinate, size: Size) -> Point {
        let (cx, cy) = self.world(self.center);
        let (x, y) = self.world(coordinate);
        Point::new(
            (x - cx) as f32 + size.width / 2.0,
            (y - cy) as f32 + size.height / 2.0,
        )
    }

    pub fn meters_per_pixel(&self, lat: f64) -> f64 {
        METERS_PER_PIXEL_Z0 * lat.to_radians().cos() / 2f64.powf(self.zoom)
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::from_rgb(0.91, 0.26, 0.21),
        Severity::Medium => Color::from_rgb(0.98, 0.62, 0.15),
        Severity::Low => Color::from_rgb(0.30, 0.75, 0.40),
    }
}

/// Everything the map canvas draws in one frame.
#[derive(Debug, Clone)]
pub struct MapScene {
    pub projection: Projection,
    pub zone: Option<OperationZone>,
    pub markers: Vec<Marker>,
    pub ships: Vec<ShipPosition>,
    pub in_zone: HashSet<u64>,
    pub route: Option<(Coordinate, Coordinate)>,
    pub news: Vec<NewsEvent>,
}

impl MapScene {
    /// Screen positions of the news events that fall inside the canvas.
    pub fn news_anchors(&self, size: Size) -> Vec<(Point, &NewsEvent)> {
        self.news
            .iter()
            .map(|event| (self.projection.to_screen(event.coordinate(), size), event))
            .filter(|(point, _)| bounds_contain(size, *point))
            .collect()
    }
}

impl<Message> canvas::Program<Message> for MapScene {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let size = bounds.size();
        let mut frame = Frame::new(renderer, size);
        frame.fill_rectangle(Point::ORIGIN, size, Color::from_rgb(0.04, 0.09, 0.16));

        if let Some(zone) = &self.zone {
            let center = self.projection.to_screen(zone.center, size);
            let radius =
                (zone.radius_m / self.projection.meters_per_pixel(zone.center.lat)) as f32;
            let circle = Path::circle(center, radius);
            frame.fill(&circle, Color::from_rgba(0.91, 0.26, 0.21, 0.12));
            frame.stroke(
                &circle,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.91, 0.26, 0.21)),
            );
        }

        if let Some((from, to)) = self.route {
            let line = Path::line(
                self.projection.to_screen(from, size),
                self.projection.to_screen(to, size),
            );
            frame.stroke(
                &line,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.95, 0.85, 0.3)),
            );
        }

        for ship in &self.ships {
            let point = self.projection.to_screen(ship.coordinate(), size);
            if !bounds_contain(size, point) {
                continue;
            }
            let heading = (ship.cog as f32).to_radians();
            let tip = Point::new(point.x + 7.0 * heading.sin(), point.y - 7.0 * heading.cos());
            let color = if self.in_zone.contains(&ship.mmsi) {
                Color::from_rgb(1.0, 0.85, 0.2)
            } else {
                Color::from_rgb(0.3, 0.8, 0.95)
            };
            frame.fill(&Path::circle(point, 3.0), color);
            frame.stroke(
                &Path::line(point, tip),
                Stroke::default().with_width(1.5).with_color(color),
            );
        }

        for marker in &self.markers {
            let point = self.projection.to_screen(marker.coordinate(), size);
            if !bounds_contain(size, point) {
                continue;
            }
            frame.fill(&Path::circle(point, 7.0), severity_color(marker.severity));
            frame.fill_text(Text {
                content: marker.name.clone(),
                position: Point::new(point.x + 9.0, point.y - 6.0),
                color: Color::WHITE,
                size: Pixels(12.0),
                ..Text::default()
            });
        }

        for (point, event) in self.news_anchors(size) {
            let color = severity_color(event.severity);
            frame.fill(&Path::circle(point, 9.0), color);
            frame.fill(&Path::circle(point, 3.5), Color::WHITE);
            frame.fill_text(Text {
                content: event.title.clone(),
                position: Point::new(point.x + 11.0, point.y - 6.0),
                color,
                size: Pixels(11.0),
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}

fn bounds_contain(size: Size, point: Point) -> bool {
    point.x >= 0.0 && point.y >= 0.0 && point.x <= size.width && point.y <= size.height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        Projection {
            center: Coordinate::new(15.9, 44.0),
            zoom: 7.0,
        }
    }

    #[test]
    fn view_center_lands_in_the_middle() {
        let size = Size::new(800.0, 600.0);
        let point = projection().to_screen(Coordinate::new(15.9, 44.0), size);
        assert!((point.x - 400.0).abs() < 1e-3);
        assert!((point.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let size = Size::new(800.0, 600.0);
        let center = projection().to_screen(Coordinate::new(15.9, 44.0), size);
        let north_east = projection().to_screen(Coordinate::new(16.2, 44.3), size);
        assert!(north_east.x > center.x);
        assert!(north_east.y < center.y);
    }

    #[test]
    fn only_visible_news_events_are_anchored() {
        let event = |title: &str, lat: f64, lon: f64| NewsEvent {
            title: title.into(),
            description: String::new(),
            date: "2024-01-15".into(),
            lat,
            lon,
            severity: Severity::High,
            kind: "attack".into(),
        };
        let scene = MapScene {
            projection: projection(),
            zone: None,
            markers: Vec::new(),
            ships: Vec::new(),
            in_zone: HashSet::new(),
            route: None,
            news: vec![event("Near", 15.95, 44.05), event("Far", 35.0, 10.0)],
        };
        let anchors = scene.news_anchors(Size::new(800.0, 600.0));
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].1.title, "Near");
        assert!(anchors[0].0.x > 400.0 && anchors[0].0.y < 300.0);
    }

    #[test]
    fn ground_resolution_halves_per_zoom_level() {
        let coarse = Projection { zoom: 6.0, ..projection() };
        let fine = projection();
        let ratio = coarse.meters_per_pixel(15.9) / fine.meters_per_pixel(15.9);
        assert!((ratio - 2.0).abs() < 1e-9);
    }
}
