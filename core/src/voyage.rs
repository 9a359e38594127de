use crate::geo::{haversine_km, initial_bearing_deg, Eta};
use crate::prelude::{Coordinate, IdSequence, NavError, NavResult};
use crate::tracking::capped::CappedLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cruise speed assumed by the route planner, in knots.
pub const DEFAULT_SPEED_KNOTS: f64 = 25.0;
/// Saved voyages kept in the history.
pub const VOYAGE_HISTORY: usize = 5;

/// Point-to-point route between the current position and a destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub from: Coordinate,
    pub to: Coordinate,
    pub speed_knots: f64,
    pub distance_km: f64,
    pub bearing_deg: f64,
    pub eta: Eta,
}

impl RoutePlan {
    pub fn compute(from: Coordinate, to: Coordinate, speed_knots: f64) -> NavResult<Self> {
        from.validate()?;
        to.validate()?;
        let distance_km = haversine_km(from, to);
        let eta = Eta::from_knots(distance_km, speed_knots)?;
        Ok(Self {
            from,
            to,
            speed_knots,
            distance_km,
            bearing_deg: initial_bearing_deg(from, to),
            eta,
        })
    }
}

/// Immutable history entry for a computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voyage {
    pub id: String,
    pub date: DateTime<Utc>,
    pub from: Coordinate,
    pub to: Coordinate,
    pub distance_km: f64,
    pub duration: String,
    pub speed_knots: f64,
}

impl Voyage {
    /// Route plan equivalent, for loading the voyage back into the planner.
    pub fn to_plan(&self) -> NavResult<RoutePlan> {
        RoutePlan::compute(self.from, self.to, self.speed_knots)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<Voyage>", into = "Vec<Voyage>")]
pub struct VoyageLog {
    voyages: CappedLog<Voyage>,
    ids: IdSequence,
}

impl VoyageLog {
    pub fn new() -> Self {
        Self {
            voyages: CappedLog::with_capacity(VOYAGE_HISTORY),
            ids: IdSequence::new(),
        }
    }

    pub fn record(&mut self, plan: &RoutePlan) -> NavResult<Voyage> {
        let voyage = Voyage {
            id: self.ids.next()?.to_string(),
            date: Utc::now(),
            from: plan.from,
            to: plan.to,
            distance_km: plan.distance_km,
            duration: plan.eta.to_string(),
            speed_knots: plan.speed_knots,
        };
        self.voyages.push(voyage.clone());
        Ok(voyage)
    }

    pub fn delete(&mut self, id: &str) -> NavResult<()> {
        match self.voyages.remove_where(|voyage| voyage.id == id) {
            0 => Err(NavError::UnknownVoyage(id.to_string())),
            _ => Ok(()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Voyage> {
        self.voyages.iter().find(|voyage| voyage.id == id)
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Voyage> {
        self.voyages.iter()
    }

    pub fn len(&self) -> usize {
        self.voyages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voyages.is_empty()
    }
}

impl Default for VoyageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Voyage>> for VoyageLog {
    fn from(voyages: Vec<Voyage>) -> Self {
        let mut log = VoyageLog::new();
        for voyage in voyages.into_iter().take(VOYAGE_HISTORY).rev() {
            if let Ok(id) = voyage.id.parse() {
                log.ids.observe(id);
            }
            log.voyages.push(voyage);
        }
        log
    }
}

impl From<VoyageLog> for Vec<Voyage> {
    fn from(log: VoyageLog) -> Self {
        log.voyages.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> RoutePlan {
        RoutePlan::compute(
            Coordinate::new(21.5433, 39.152),
            Coordinate::new(21.6433, 39.152),
            DEFAULT_SPEED_KNOTS,
        )
        .unwrap()
    }

    #[test]
    fn route_plan_reports_distance_bearing_and_eta() {
        let plan = plan();
        assert!((plan.distance_km - 11.12).abs() < 0.01);
        assert!(plan.bearing_deg.abs() < 1e-6);
        assert_eq!(plan.eta.whole_hours, 0);
        assert_eq!(plan.eta.minutes, 14);
    }

    #[test]
    fn route_plan_rejects_zero_speed() {
        assert!(RoutePlan::compute(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            0.0
        )
        .is_err());
    }

    #[test]
    fn history_keeps_five_newest_first() {
        let mut log = VoyageLog::new();
        let mut ids = Vec::new();
        for _ in 0..7 {
            ids.push(log.record(&plan()).unwrap().id);
        }
        let kept: Vec<String> = log.iter().map(|voyage| voyage.id.clone()).collect();
        let expected: Vec<String> = ids.iter().rev().take(5).cloned().collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn delete_by_id() {
        let mut log = VoyageLog::new();
        let id = log.record(&plan()).unwrap().id;
        assert!(log.get(&id).is_some());
        log.delete(&id).unwrap();
        assert!(log.is_empty());
        assert!(matches!(log.delete(&id), Err(NavError::UnknownVoyage(_))));
    }

    #[test]
    fn serialized_order_is_preserved() {
        let mut log = VoyageLog::new();
        log.record(&plan()).unwrap();
        log.record(&plan()).unwrap();
        let before: Vec<String> = log.iter().map(|voyage| voyage.id.clone()).collect();
        let json = serde_json::to_string(&log).unwrap();
        let restored: VoyageLog = serde_json::from_str(&json).unwrap();
        let after: Vec<String> = restored.iter().map(|voyage| voyage.id.clone()).collect();
        assert_eq!(before, after);
    }
}
