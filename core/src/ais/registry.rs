use crate::ais::position::ShipPosition;
use crate::tracking::filters::ShipFilter;
use std::collections::HashMap;

/// Latest known position per MMSI. Each update overwrites the previous one.
#[derive(Debug, Clone, Default)]
pub struct ShipRegistry {
    ships: HashMap<u64, ShipPosition>,
}

impl ShipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the report and returns `true` when the MMSI was not known yet.
    pub fn upsert(&mut self, ship: ShipPosition) -> bool {
        self.ships.insert(ship.mmsi, ship).is_none()
    }

    pub fn get(&self, mmsi: u64) -> Option<&ShipPosition> {
        self.ships.get(&mmsi)
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Borrowing view in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ShipPosition> {
        self.ships.values()
    }

    /// Ships passing `filter`, unordered and without cloning.
    pub fn matching<'a>(
        &'a self,
        filter: &'a ShipFilter,
    ) -> impl Iterator<Item = &'a ShipPosition> + 'a {
        self.ships.values().filter(move |ship| filter.matches(ship))
    }

    /// All ships, ordered by MMSI.
    pub fn snapshot(&self) -> Vec<ShipPosition> {
        let mut ships: Vec<_> = self.ships.values().cloned().collect();
        ships.sort_by_key(|ship| ship.mmsi);
        ships
    }

    /// Ships passing `filter`, ordered by MMSI.
    pub fn filtered(&self, filter: &ShipFilter) -> Vec<ShipPosition> {
        let mut ships: Vec<_> = self.matching(filter).cloned().collect();
        ships.sort_by_key(|ship| ship.mmsi);
        ships
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_reports_overwrite_earlier_ones() {
        let mut registry = ShipRegistry::new();
        assert!(registry.upsert(ShipPosition::new(7, 15.0, 42.0)));
        assert!(!registry.upsert(ShipPosition::new(7, 15.5, 42.5)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(7).unwrap().lat, 15.5);
    }

    #[test]
    fn filtered_applies_speed_bounds() {
        let mut registry = ShipRegistry::new();
        let mut slow = ShipPosition::new(1, 15.0, 42.0);
        slow.sog = 2.0;
        let mut fast = ShipPosition::new(2, 15.0, 42.0);
        fast.sog = 30.0;
        registry.upsert(slow);
        registry.upsert(fast);

        let filter = ShipFilter {
            min_speed: 10.0,
            ..ShipFilter::default()
        };
        let ships = registry.filtered(&filter);
        assert_eq!(ships.len(), 1);
        assert_eq!(ships[0].mmsi, 2);
        assert_eq!(registry.matching(&filter).count(), 1);
        assert_eq!(registry.iter().count(), 2);
    }
}
