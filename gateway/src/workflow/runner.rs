use crate::generator::traffic::{SyntheticFleet, TrafficConfig};
use crate::workflow::config::{GatewayConfig, ScenarioConfig};
use anyhow::Context;
use navmapcore::ais::{BoundingBox, ShipRegistry};
use navmapcore::tracking::{ZoneAlert, ZoneTracker};

pub struct WorkflowResult {
    pub ticks: usize,
    pub entries: Vec<(usize, ZoneAlert)>,
    pub final_members: usize,
    pub recent_alerts: Vec<ZoneAlert>,
}

/// Drives synthetic traffic through the zone tracker, tick by tick.
#[derive(Clone)]
pub struct Runner {
    scenario: ScenarioConfig,
    area: BoundingBox,
}

impl Runner {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            scenario: config.scenario.clone(),
            area: config.relay.bounding_box,
        }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let traffic = TrafficConfig {
            ships: self.scenario.ships,
            seed: self.scenario.seed,
            area: self.area,
            ..TrafficConfig::default()
        };
        let mut fleet = SyntheticFleet::new(&traffic).context("building synthetic fleet")?;
        self.scenario
            .zone
            .validate()
            .context("validating scenario zone")?;

        let mut registry = ShipRegistry::new();
        let mut tracker = ZoneTracker::new();
        tracker.start();

        let mut entries = Vec::new();
        let mut final_members = 0;
        for tick in 0..self.scenario.ticks {
            if tick > 0 {
                fleet.advance(self.scenario.tick_minutes);
            }
            for ship in fleet.ships() {
                registry.upsert(ship.clone());
            }
            let evaluation = tracker.evaluate(&self.scenario.zone, &registry.snapshot());
            final_members = evaluation.members.len();
            entries.extend(evaluation.new_entries.into_iter().map(|alert| (tick, alert)));
        }

        Ok(WorkflowResult {
            ticks: self.scenario.ticks,
            entries,
            final_members,
            recent_alerts: tracker.recent_alerts().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navmapcore::tracking::OperationZone;
    use navmapcore::Coordinate;

    fn config(radius_m: f64) -> GatewayConfig {
        let mut cfg = GatewayConfig::default();
        cfg.scenario = ScenarioConfig {
            ships: 30,
            ticks: 12,
            tick_minutes: 15.0,
            seed: 11,
            zone: OperationZone::new(Coordinate::new(15.9, 44.0), radius_m).unwrap(),
        };
        cfg
    }

    #[test]
    fn runner_executes_workflow() {
        let result = Runner::new(&config(80_000.0)).execute().unwrap();
        assert_eq!(result.ticks, 12);
        assert!(result.recent_alerts.len() <= 5);
        assert!(result.final_members <= 30);
    }

    #[test]
    fn zone_covering_the_whole_area_reports_every_ship_once() {
        let result = Runner::new(&config(2_000_000.0)).execute().unwrap();
        assert_eq!(result.entries.len(), 30);
        assert!(result.entries.iter().all(|(tick, _)| *tick == 0));
        assert_eq!(result.final_members, 30);
    }

    #[test]
    fn runner_is_deterministic_for_a_seed() {
        let runner = Runner::new(&config(80_000.0));
        let first = runner.execute().unwrap();
        let second = runner.execute().unwrap();
        assert_eq!(first.entries, second.entries);
    }
}
