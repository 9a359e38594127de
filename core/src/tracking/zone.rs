use crate::ais::position::ShipPosition;
use crate::geo::haversine_m;
use crate::prelude::{Coordinate, NavError, NavResult};
use crate::telemetry::log::LogManager;
use crate::tracking::capped::CappedLog;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How many entry alerts the tracker remembers.
pub const RECENT_ALERTS: usize = 5;

/// Circular operation zone. The radius is in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationZone {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl OperationZone {
    pub fn new(center: Coordinate, radius_m: f64) -> NavResult<Self> {
        let zone = Self { center, radius_m };
        zone.validate()?;
        Ok(zone)
    }

    pub fn validate(&self) -> NavResult<()> {
        self.center.validate()?;
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(NavError::InvalidRadius(self.radius_m));
        }
        Ok(())
    }

    pub fn contains(&self, position: Coordinate) -> bool {
        haversine_m(self.center, position) <= self.radius_m
    }
}

impl Default for OperationZone {
    fn default() -> Self {
        Self {
            center: Coordinate::new(15.9, 44.0),
            radius_m: 50_000.0,
        }
    }
}

/// A ship that crossed into the zone since the previous evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAlert {
    pub mmsi: u64,
    pub name: Option<String>,
    pub sog: f64,
    pub cog: f64,
}

impl ZoneAlert {
    fn from_ship(ship: &ShipPosition) -> Self {
        Self {
            mmsi: ship.mmsi,
            name: ship.name.clone(),
            sog: ship.sog,
            cog: ship.cog,
        }
    }

    pub fn describe(&self) -> String {
        let label = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("MMSI: {}", self.mmsi),
        };
        format!("{} - speed {:.1} kn", label, self.sog)
    }
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneEvaluation {
    pub members: Vec<ShipPosition>,
    pub new_entries: Vec<ZoneAlert>,
}

/// Edge detector for ships entering the operation zone.
///
/// Membership is recomputed from scratch on each pass; the only state carried
/// between passes is the previous member set and the recent alerts.
#[derive(Debug, Clone)]
pub struct ZoneTracker {
    active: bool,
    previous: HashSet<u64>,
    alerts: CappedLog<ZoneAlert>,
    logger: LogManager,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self {
            active: false,
            previous: HashSet::new(),
            alerts: CappedLog::with_capacity(RECENT_ALERTS),
            logger: LogManager::new("zone"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts tracking with a clean slate.
    pub fn start(&mut self) {
        self.active = true;
        self.previous.clear();
        self.alerts.clear();
        self.logger.record("tracking started");
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.logger.record("tracking stopped");
    }

    /// Membership is recomputed from `ships` alone, so callers decide which
    /// ships are tracked by what they pass in. New entries come out in MMSI
    /// order.
    pub fn evaluate<'a, I>(&mut self, zone: &OperationZone, ships: I) -> ZoneEvaluation
    where
        I: IntoIterator<Item = &'a ShipPosition>,
    {
        if !self.active {
            return ZoneEvaluation::default();
        }

        let members: Vec<ShipPosition> = ships
            .into_iter()
            .filter(|ship| zone.contains(ship.coordinate()))
            .cloned()
            .collect();
        let current: HashSet<u64> = members.iter().map(|ship| ship.mmsi).collect();

        let mut seen = HashSet::new();
        let mut new_entries: Vec<ZoneAlert> = members
            .iter()
            .filter(|ship| !self.previous.contains(&ship.mmsi) && seen.insert(ship.mmsi))
            .map(ZoneAlert::from_ship)
            .collect();
        new_entries.sort_by_key(|alert| alert.mmsi);

        for alert in &new_entries {
            self.logger
                .record(&format!("ship entered zone: {}", alert.describe()));
            self.alerts.push(alert.clone());
        }
        self.previous = current;

        ZoneEvaluation {
            members,
            new_entries,
        }
    }

    /// Newest first, at most [`RECENT_ALERTS`].
    pub fn recent_alerts(&self) -> impl Iterator<Item = &ZoneAlert> {
        self.alerts.iter()
    }

    pub fn dismiss(&mut self, mmsi: u64) -> bool {
        self.alerts.remove_where(|alert| alert.mmsi == mmsi) > 0
    }
}

impl Default for ZoneTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ais::registry::ShipRegistry;
    use crate::tracking::filters::ShipFilter;

    fn origin_zone() -> OperationZone {
        OperationZone::new(Coordinate::new(0.0, 0.0), 1000.0).unwrap()
    }

    fn ship_at(mmsi: u64, lat: f64, lon: f64) -> ShipPosition {
        ShipPosition::new(mmsi, lat, lon)
    }

    fn mmsis(alerts: &[ZoneAlert]) -> Vec<u64> {
        let mut ids: Vec<u64> = alerts.iter().map(|alert| alert.mmsi).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn membership_uses_meters() {
        let zone = origin_zone();
        assert!(zone.contains(Coordinate::new(0.0, 0.0)));
        assert!(!zone.contains(Coordinate::new(0.0, 1.0)));
    }

    #[test]
    fn only_fresh_members_are_new_entries() {
        let zone = origin_zone();
        let mut tracker = ZoneTracker::new();
        tracker.start();

        let first = tracker.evaluate(&zone, &[ship_at(1, 0.0, 0.0), ship_at(2, 0.001, 0.0)]);
        assert_eq!(mmsis(&first.new_entries), vec![1, 2]);

        let second = tracker.evaluate(
            &zone,
            &[
                ship_at(1, 0.0, 1.0),
                ship_at(2, 0.001, 0.0),
                ship_at(3, 0.0, 0.001),
            ],
        );
        assert_eq!(mmsis(&second.new_entries), vec![3]);
        assert_eq!(second.members.len(), 2);
    }

    #[test]
    fn ship_leaving_and_returning_alerts_again() {
        let zone = origin_zone();
        let mut tracker = ZoneTracker::new();
        tracker.start();

        tracker.evaluate(&zone, &[ship_at(9, 0.0, 0.0)]);
        tracker.evaluate(&zone, &[ship_at(9, 0.0, 1.0)]);
        let back = tracker.evaluate(&zone, &[ship_at(9, 0.0, 0.0)]);
        assert_eq!(mmsis(&back.new_entries), vec![9]);
    }

    #[test]
    fn inactive_tracker_reports_nothing() {
        let mut tracker = ZoneTracker::new();
        let evaluation = tracker.evaluate(&origin_zone(), &[ship_at(1, 0.0, 0.0)]);
        assert_eq!(evaluation, ZoneEvaluation::default());
        assert_eq!(tracker.recent_alerts().count(), 0);
    }

    #[test]
    fn recent_alerts_are_capped_and_dismissable() {
        let zone = origin_zone();
        let mut tracker = ZoneTracker::new();
        tracker.start();
        for mmsi in 1..=7 {
            tracker.evaluate(&zone, &[ship_at(mmsi, 0.0, 0.0)]);
        }

        let recent: Vec<u64> = tracker.recent_alerts().map(|alert| alert.mmsi).collect();
        assert_eq!(recent, vec![7, 6, 5, 4, 3]);
        assert!(tracker.dismiss(5));
        assert!(!tracker.dismiss(1));
        assert_eq!(tracker.recent_alerts().count(), 4);
    }

    #[test]
    fn restarting_clears_previous_membership() {
        let zone = origin_zone();
        let mut tracker = ZoneTracker::new();
        tracker.start();
        tracker.evaluate(&zone, &[ship_at(1, 0.0, 0.0)]);
        tracker.stop();
        tracker.start();
        let evaluation = tracker.evaluate(&zone, &[ship_at(1, 0.0, 0.0)]);
        assert_eq!(mmsis(&evaluation.new_entries), vec![1]);
    }

    #[test]
    fn ships_hidden_by_the_filter_never_enter() {
        let zone = origin_zone();
        let mut registry = ShipRegistry::new();
        let mut cargo = ship_at(1, 0.0, 0.0);
        cargo.ship_type = Some(70);
        cargo.sog = 12.0;
        let mut tanker = ship_at(2, 0.0, 0.001);
        tanker.ship_type = Some(80);
        tanker.sog = 12.0;
        let mut drifting = ship_at(3, 0.001, 0.0);
        drifting.ship_type = Some(70);
        drifting.sog = 0.2;
        for ship in [cargo, tanker, drifting] {
            registry.upsert(ship);
        }

        let filter = ShipFilter {
            types: vec![70],
            min_speed: 1.0,
            ..ShipFilter::default()
        };
        let mut tracker = ZoneTracker::new();
        tracker.start();
        let evaluation = tracker.evaluate(&zone, registry.matching(&filter));
        assert_eq!(mmsis(&evaluation.new_entries), vec![1]);
        assert_eq!(evaluation.members.len(), 1);

        let everyone = tracker.evaluate(&zone, registry.iter());
        assert_eq!(mmsis(&everyone.new_entries), vec![2, 3]);
    }

    #[test]
    fn zone_rejects_non_positive_radius() {
        assert!(matches!(
            OperationZone::new(Coordinate::new(0.0, 0.0), 0.0),
            Err(NavError::InvalidRadius(_))
        ));
    }

    #[test]
    fn alert_description_falls_back_to_mmsi() {
        let mut ship = ship_at(42, 0.0, 0.0);
        ship.sog = 12.34;
        assert_eq!(ZoneAlert::from_ship(&ship).describe(), "MMSI: 42 - speed 12.3 kn");
    }
}
