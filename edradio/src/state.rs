//! Per-station song slots
//!
//! One [`Observable`] per station name, holding the latest poll result
//! (`None` before the first poll and after a failed one). Each slot has a
//! single writer, the station's worker.

use crate::models::SongSnapshot;
use edutils::Observable;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

/// Song slot of one station
pub type SongSlot = Arc<Observable<Option<SongSnapshot>>>;

/// Song slots of every registered station. Clones share the slots.
#[derive(Debug, Clone, Default)]
pub struct StationStates {
    slots: Arc<RwLock<Vec<(String, SongSlot)>>>,
}

impl StationStates {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<(String, SongSlot)>> {
        self.slots.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(String, SongSlot)>> {
        self.slots.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, name: &str) -> Option<SongSlot> {
        self.read()
            .iter()
            .find(|(station, _)| station == name)
            .map(|(_, slot)| Arc::clone(slot))
    }

    /// Returns the slot of `name`, creating an empty one on first call
    pub fn register(&self, name: &str) -> SongSlot {
        let mut slots = self.write();
        if let Some((_, slot)) = slots.iter().find(|(station, _)| station == name) {
            return Arc::clone(slot);
        }
        let slot: SongSlot = Arc::new(Observable::default());
        slots.push((name.to_string(), Arc::clone(&slot)));
        slot
    }

    /// Latest song of `name`, `None` when unknown or absent
    pub fn get(&self, name: &str) -> Option<SongSnapshot> {
        self.slot(name).and_then(|slot| slot.get())
    }

    pub fn subscribe(&self, name: &str) -> Option<watch::Receiver<Option<SongSnapshot>>> {
        self.slot(name).map(|slot| slot.subscribe())
    }

    /// Registered station names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.read().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressFormula, SongDuration};

    #[test]
    fn test_register_is_idempotent() {
        let states = StationStates::new();
        let a = states.register("Radio Sidewinder");
        let b = states.register("Radio Sidewinder");
        states.register("Hutton Orbital Radio");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(states.names(), ["Radio Sidewinder", "Hutton Orbital Radio"]);
    }

    #[test]
    fn test_slots_start_empty_and_notify() {
        let states = StationStates::new();
        let slot = states.register("Radio Skvortsov");
        let mut rx = states.subscribe("Radio Skvortsov").unwrap();

        assert_eq!(states.get("Radio Skvortsov"), None);
        assert!(states.subscribe("Unknown FM").is_none());

        let song = SongSnapshot::new(SongDuration::Finite(1_000), 0, ProgressFormula::Elapsed);
        slot.set(Some(song.clone()));

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(song.clone()));
        assert_eq!(states.clone().get("Radio Skvortsov"), Some(song));
    }
}
