use crate::prelude::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Central angle between two points in radians.
fn central_angle(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance in kilometers. Used by route planning.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    EARTH_RADIUS_KM * central_angle(a, b)
}

/// Great-circle distance in meters. Used by zone membership.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    EARTH_RADIUS_M * central_angle(a, b)
}

/// Forward azimuth from `a` towards `b`, normalized to `[0, 360)`.
pub fn initial_bearing_deg(a: Coordinate, b: Coordinate) -> f64 {
    let d_lon = (b.lon - a.lon).to_radians();
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JEDDAH: Coordinate = Coordinate {
        lat: 21.5433,
        lon: 39.1520,
    };

    #[test]
    fn coincident_points_have_zero_distance() {
        assert_eq!(haversine_km(JEDDAH, JEDDAH), 0.0);
        assert_eq!(haversine_m(Coordinate::new(-45.0, 170.0), Coordinate::new(-45.0, 170.0)), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (JEDDAH, Coordinate::new(15.9, 44.0)),
            (Coordinate::new(0.0, 0.0), Coordinate::new(-33.9, 151.2)),
            (Coordinate::new(51.5, -0.1), Coordinate::new(40.7, -74.0)),
        ];
        for (a, b) in pairs {
            assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn tenth_of_a_degree_of_latitude_is_about_eleven_km() {
        let north = Coordinate::new(21.6433, 39.1520);
        let distance = haversine_km(JEDDAH, north);
        assert!((distance - 11.12).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn meters_and_kilometers_share_one_formula() {
        let b = Coordinate::new(15.9, 44.0);
        assert!((haversine_m(JEDDAH, b) - haversine_km(JEDDAH, b) * 1000.0).abs() < 1e-6);
    }

    #[test]
    fn bearing_points_along_the_cardinal_axes() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!(initial_bearing_deg(origin, Coordinate::new(1.0, 0.0)).abs() < 1e-9);
        assert!((initial_bearing_deg(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing_deg(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing_deg(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }
}
