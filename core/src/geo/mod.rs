pub mod eta;
pub mod haversine;

pub use eta::{Eta, KNOTS_TO_KMH};
pub use haversine::{haversine_km, haversine_m, initial_bearing_deg, EARTH_RADIUS_KM, EARTH_RADIUS_M};
