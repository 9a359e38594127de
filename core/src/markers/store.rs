use crate::markers::model::{Marker, MarkerDraft};
use crate::prelude::{Coordinate, IdSequence, NavError, NavResult};
use crate::tracking::filters::MarkerFilter;
use serde::{Deserialize, Serialize};

/// Ordered marker collection with wall-clock ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Marker>", into = "Vec<Marker>")]
pub struct MarkerStore {
    markers: Vec<Marker>,
    ids: IdSequence,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, draft: MarkerDraft) -> NavResult<&Marker> {
        draft.validate()?;
        let id = self.ids.next()?;
        self.markers.push(draft.into_marker(id));
        let index = self.markers.len() - 1;
        Ok(&self.markers[index])
    }

    /// Replaces every editable field of marker `id`, keeping its id.
    pub fn update(&mut self, id: u64, draft: MarkerDraft) -> NavResult<&Marker> {
        draft.validate()?;
        let slot = self.slot_mut(id)?;
        *slot = draft.into_marker(id);
        Ok(slot)
    }

    pub fn move_to(&mut self, id: u64, coordinate: Coordinate) -> NavResult<&Marker> {
        coordinate.validate()?;
        let slot = self.slot_mut(id)?;
        slot.lat = coordinate.lat;
        slot.lng = coordinate.lon;
        Ok(slot)
    }

    pub fn delete(&mut self, id: u64) -> NavResult<Marker> {
        let index = self
            .markers
            .iter()
            .position(|marker| marker.id == id)
            .ok_or(NavError::UnknownMarker(id))?;
        Ok(self.markers.remove(index))
    }

    pub fn get(&self, id: u64) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn filtered(&self, filter: &MarkerFilter) -> Vec<&Marker> {
        self.markers
            .iter()
            .filter(|marker| filter.matches(marker))
            .collect()
    }

    fn slot_mut(&mut self, id: u64) -> NavResult<&mut Marker> {
        self.markers
            .iter_mut()
            .find(|marker| marker.id == id)
            .ok_or(NavError::UnknownMarker(id))
    }
}

impl From<Vec<Marker>> for MarkerStore {
    fn from(markers: Vec<Marker>) -> Self {
        let mut ids = IdSequence::new();
        for marker in &markers {
            ids.observe(marker.id);
        }
        Self { markers, ids }
    }
}

impl From<MarkerStore> for Vec<Marker> {
    fn from(store: MarkerStore) -> Self {
        store.markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::model::Severity;

    fn draft(name: &str) -> MarkerDraft {
        MarkerDraft::new(name, "ship", Coordinate::new(21.5433, 39.152))
    }

    #[test]
    fn markers_get_unique_ids() {
        let mut store = MarkerStore::new();
        let first = store.add(draft("Alpha")).unwrap().id;
        let second = store.add(draft("Bravo")).unwrap().id;
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn invalid_drafts_do_not_mutate_the_store() {
        let mut store = MarkerStore::new();
        assert!(store.add(draft("   ")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn update_keeps_the_id() {
        let mut store = MarkerStore::new();
        let id = store.add(draft("Alpha")).unwrap().id;

        let mut edited = draft("Alpha two");
        edited.severity = Severity::High;
        let updated = store.update(id, edited).unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.name, "Alpha two");
        assert_eq!(updated.severity, Severity::High);
    }

    #[test]
    fn move_and_delete_require_known_ids() {
        let mut store = MarkerStore::new();
        let id = store.add(draft("Alpha")).unwrap().id;

        let moved = store.move_to(id, Coordinate::new(20.0, 38.0)).unwrap();
        assert_eq!((moved.lat, moved.lng), (20.0, 38.0));
        assert!(matches!(
            store.move_to(id + 1, Coordinate::new(20.0, 38.0)),
            Err(NavError::UnknownMarker(_))
        ));
        assert!(store.move_to(id, Coordinate::new(20.0, 200.0)).is_err());

        assert_eq!(store.delete(id).unwrap().name, "Alpha");
        assert!(matches!(store.delete(id), Err(NavError::UnknownMarker(_))));
    }

    #[test]
    fn loaded_ids_are_never_reissued() {
        let existing = draft("Far future").into_marker(u64::MAX - 1);
        let mut store = MarkerStore::from(vec![existing]);
        let id = store.add(draft("Next")).unwrap().id;
        assert_eq!(id, u64::MAX);

        assert!(matches!(
            store.add(draft("Overflow")),
            Err(NavError::IdsExhausted(u64::MAX))
        ));
        assert_eq!(store.len(), 2);

        let saturated = draft("Saturated").into_marker(u64::MAX);
        let mut store = MarkerStore::from(vec![saturated]);
        assert!(store.add(draft("Next")).is_err());
        assert_eq!(store.len(), 1);
    }
}
