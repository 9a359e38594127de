use anyhow::Context;
use navmapcore::ais::{BoundingBox, ShipPosition};
use navmapcore::geo::KNOTS_TO_KMH;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Kilometers per degree of latitude on the 6371 km sphere.
const KM_PER_DEGREE: f64 = 111.195;

/// Configuration for generating synthetic AIS traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub ships: usize,
    pub seed: u64,
    pub area: BoundingBox,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            ships: 40,
            seed: 0,
            area: BoundingBox::SOUTHERN_RED_SEA,
            min_speed: 4.0,
            max_speed: 22.0,
        }
    }
}

/// Dead-reckoned fleet that stays inside its bounding box.
pub struct SyntheticFleet {
    ships: Vec<ShipPosition>,
    area: BoundingBox,
    rng: StdRng,
}

impl SyntheticFleet {
    pub fn new(config: &TrafficConfig) -> anyhow::Result<Self> {
        config
            .area
            .validate()
            .context("validating synthetic traffic area")?;
        anyhow::ensure!(
            config.min_speed >= 0.0 && config.min_speed < config.max_speed,
            "speed window {}..{} is empty",
            config.min_speed,
            config.max_speed
        );

        let mut rng = StdRng::seed_from_u64(config.seed);
        let area = config.area;
        let ships = (0..config.ships)
            .map(|index| {
                let mut ship = ShipPosition::new(
                    403_000_000 + index as u64,
                    rng.gen_range(area.south..area.north),
                    rng.gen_range(area.west..area.east),
                );
                ship.cog = rng.gen_range(0.0..360.0);
                ship.sog = rng.gen_range(config.min_speed..config.max_speed);
                ship.ship_type = Some(rng.gen_range(70..=89));
                ship.name = Some(format!("SIM-{index:03}"));
                ship
            })
            .collect();

        Ok(Self { ships, area, rng })
    }

    pub fn ships(&self) -> &[ShipPosition] {
        &self.ships
    }

    /// Moves every ship along its course for `minutes`, turning it around at
    /// the area edges and adding a little course jitter.
    pub fn advance(&mut self, minutes: f64) {
        for ship in &mut self.ships {
            let distance_km = ship.sog * KNOTS_TO_KMH * minutes / 60.0;
            let course = ship.cog.to_radians();
            let d_lat = distance_km * course.cos() / KM_PER_DEGREE;
            let d_lon =
                distance_km * course.sin() / (KM_PER_DEGREE * ship.lat.to_radians().cos().max(0.01));

            let next_lat = ship.lat + d_lat;
            let next_lon = ship.lon + d_lon;
            if next_lat < self.area.south || next_lat > self.area.north {
                ship.cog = (180.0 - ship.cog).rem_euclid(360.0);
            } else {
                ship.lat = next_lat;
            }
            if next_lon < self.area.west || next_lon > self.area.east {
                ship.cog = (360.0 - ship.cog).rem_euclid(360.0);
            } else {
                ship.lon = next_lon;
            }

            let jitter: f64 = self.rng.gen_range(-5.0..5.0);
            ship.cog = (ship.cog + jitter).rem_euclid(360.0);
        }
    }
}
