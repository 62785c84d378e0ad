// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ephemeral per-track runtime state.
//!
//! One record per track, owned exclusively by the engine. Created
//! lazily on start (or on the first tick after a mid-playback add),
//! discarded entirely on stop, never serialized.

use animdeck_model::TrackId;
use indexmap::IndexMap;

/// Engine-side bookkeeping for one track
#[derive(Debug, Clone)]
pub struct TrackRuntime {
    /// Slot the engine is currently driving
    pub current_slot: usize,
    /// `elapsed_time` at which the current slot began
    pub slot_start_time: f64,
    /// Duration of the current slot's animation in ms
    pub animation_duration: f64,
    /// Whether the track holds its last frame until the next restart
    pub is_frozen: bool,
    /// Whether the renderer loops the slot's animation
    pub is_looping: bool,
    /// Guards `empty-slot-encountered` against an event storm
    pub reported_empty: bool,
}

impl TrackRuntime {
    /// Fresh record for a track parked at slot 0
    pub fn new(slot_start_time: f64, animation_duration: f64) -> Self {
        Self {
            current_slot: 0,
            slot_start_time,
            animation_duration,
            is_frozen: false,
            is_looping: false,
            reported_empty: false,
        }
    }
}

/// Dense arena of runtime records indexed by track identity.
///
/// Records live in a flat `Vec`; a side index maps track ids to
/// positions and is fixed up on swap-removal, so repeated add/remove
/// churn cannot grow the arena without bound.
#[derive(Debug, Default)]
pub struct RuntimeArena {
    ids: Vec<TrackId>,
    records: Vec<TrackRuntime>,
    index: IndexMap<TrackId, usize>,
}

impl RuntimeArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the arena holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record exists for the track
    pub fn contains(&self, id: TrackId) -> bool {
        self.index.contains_key(&id)
    }

    /// Get a track's record
    pub fn get(&self, id: TrackId) -> Option<&TrackRuntime> {
        self.index.get(&id).map(|&pos| &self.records[pos])
    }

    /// Get a track's record mutably
    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut TrackRuntime> {
        self.index.get(&id).map(|&pos| &mut self.records[pos])
    }

    /// Insert or replace a track's record
    pub fn insert(&mut self, id: TrackId, runtime: TrackRuntime) {
        match self.index.get(&id) {
            Some(&pos) => self.records[pos] = runtime,
            None => {
                self.index.insert(id, self.records.len());
                self.ids.push(id);
                self.records.push(runtime);
            }
        }
    }

    /// Remove a track's record, compacting by swap
    pub fn remove(&mut self, id: TrackId) -> Option<TrackRuntime> {
        let pos = self.index.swap_remove(&id)?;
        self.ids.swap_remove(pos);
        let record = self.records.swap_remove(pos);
        if pos < self.ids.len() {
            // The tail record moved into the hole; repoint its index
            self.index.insert(self.ids[pos], pos);
        }
        Some(record)
    }

    /// Drop records whose track id fails the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(TrackId) -> bool) {
        let stale: Vec<TrackId> = self.ids.iter().copied().filter(|&id| !keep(id)).collect();
        for id in stale {
            self.remove(id);
        }
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.ids.clear();
        self.records.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut arena = RuntimeArena::new();
        let a = TrackId::new();
        let b = TrackId::new();
        arena.insert(a, TrackRuntime::new(0.0, 1000.0));
        arena.insert(b, TrackRuntime::new(0.0, 500.0));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).unwrap().animation_duration, 500.0);

        arena.remove(a);
        assert_eq!(arena.len(), 1);
        assert!(!arena.contains(a));
        // The swapped-in record is still reachable after compaction
        assert_eq!(arena.get(b).unwrap().animation_duration, 500.0);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut arena = RuntimeArena::new();
        let a = TrackId::new();
        arena.insert(a, TrackRuntime::new(0.0, 1000.0));
        arena.insert(a, TrackRuntime::new(250.0, 2000.0));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(a).unwrap().slot_start_time, 250.0);
    }

    #[test]
    fn test_retain_prunes_stale_ids() {
        let mut arena = RuntimeArena::new();
        let keep_id = TrackId::new();
        for _ in 0..4 {
            arena.insert(TrackId::new(), TrackRuntime::new(0.0, 1000.0));
        }
        arena.insert(keep_id, TrackRuntime::new(0.0, 750.0));
        arena.retain(|id| id == keep_id);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(keep_id).unwrap().animation_duration, 750.0);
    }

    #[test]
    fn test_churn_does_not_grow() {
        let mut arena = RuntimeArena::new();
        for _ in 0..1000 {
            let id = TrackId::new();
            arena.insert(id, TrackRuntime::new(0.0, 1000.0));
            arena.remove(id);
        }
        assert!(arena.is_empty());
    }
}
