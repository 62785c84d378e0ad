// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track: an ordered, mutable list of slots with a playback cursor.

use crate::error::{ModelError, Result};
use crate::events::TrackEvent;
use crate::slot::Slot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default lower bound on slots per track
pub const DEFAULT_MIN_SLOTS: usize = 1;
/// Default upper bound on slots per track
pub const DEFAULT_MAX_SLOTS: usize = 16;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered list of slots with an independent playback cursor.
///
/// Invariants: at least one slot exists at all times, and the cursor
/// always points inside the slot list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name (uniqueness is enforced by the registry facade)
    pub name: String,
    /// Whether the engine should advance this track
    pub is_active: bool,
    /// Lower bound on slot count, at least 1
    pub min_slots: usize,
    /// Upper bound on slot count
    pub max_slots: usize,
    slots: Vec<Slot>,
    current_slot_index: usize,
    #[serde(skip)]
    pending_events: Vec<TrackEvent>,
}

impl Track {
    /// Create a track pre-filled with `min_slots` empty slots
    pub fn new(name: impl Into<String>) -> Self {
        let min_slots = DEFAULT_MIN_SLOTS.max(1);
        let slots = (0..min_slots).map(|i| Slot::new(i, None)).collect();
        Self {
            id: TrackId::new(),
            name: name.into(),
            is_active: true,
            min_slots,
            max_slots: DEFAULT_MAX_SLOTS,
            slots,
            current_slot_index: 0,
            pending_events: Vec::new(),
        }
    }

    /// Get all slots
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Get slot count
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Get a slot by index
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Get a mutable slot by index
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// Current playback cursor position
    pub fn current_slot_index(&self) -> usize {
        self.current_slot_index
    }

    /// The slot under the playback cursor
    pub fn current_slot(&self) -> &Slot {
        &self.slots[self.current_slot_index]
    }

    /// Insert a slot, at the end when `index` is `None`.
    ///
    /// Returns the insertion index. All slots from that index on are
    /// re-indexed.
    pub fn add_slot(&mut self, animation: Option<&str>, index: Option<usize>) -> Result<usize> {
        if self.slots.len() >= self.max_slots {
            return Err(ModelError::Capacity {
                limit: self.max_slots,
            });
        }
        let index = index.unwrap_or(self.slots.len());
        if index > self.slots.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        self.slots
            .insert(index, Slot::new(index, animation.map(str::to_owned)));
        self.reindex_from(index);
        self.pending_events.push(TrackEvent::SlotAdded {
            index,
            animation: animation.map(str::to_owned),
        });
        Ok(index)
    }

    /// Remove the slot at `index`.
    ///
    /// The last slot (more precisely, the `min_slots` floor) cannot be
    /// removed.
    pub fn remove_slot(&mut self, index: usize) -> Result<()> {
        if self.slots.len() <= self.min_slots {
            return Err(ModelError::LastSlot);
        }
        if index >= self.slots.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        self.slots.remove(index);
        self.reindex_from(index);
        if self.current_slot_index >= self.slots.len() {
            self.current_slot_index = self.slots.len() - 1;
        }
        self.pending_events.push(TrackEvent::SlotRemoved { index });
        Ok(())
    }

    /// Move a slot from one position to another, re-indexing everything.
    ///
    /// `move_slot(i, i)` is a silent no-op.
    pub fn move_slot(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.slots.len();
        for index in [from, to] {
            if index >= len {
                return Err(ModelError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
        self.reindex_from(0);
        self.pending_events.push(TrackEvent::SlotMoved {
            from_index: from,
            to_index: to,
        });
        Ok(())
    }

    /// Assign or clear the animation of the slot at `slot_index`
    pub fn set_animation(&mut self, slot_index: usize, animation: Option<&str>) -> Result<()> {
        let len = self.slots.len();
        let Some(slot) = self.slots.get_mut(slot_index) else {
            return Err(ModelError::IndexOutOfRange {
                index: slot_index,
                len,
            });
        };
        slot.set_animation(animation);
        // Pull the slot's events immediately so ordering is preserved
        let slot_events: Vec<_> = slot.drain_events();
        self.pending_events
            .extend(slot_events.into_iter().map(TrackEvent::Slot));
        self.pending_events.push(TrackEvent::AnimationChanged {
            slot_index,
            animation: animation.map(str::to_owned),
        });
        Ok(())
    }

    /// Move the playback cursor. Silent no-op when unchanged.
    pub fn set_current_slot(&mut self, index: usize) -> Result<()> {
        if index >= self.slots.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        if index == self.current_slot_index {
            return Ok(());
        }
        let previous_index = self.current_slot_index;
        self.current_slot_index = index;
        self.pending_events
            .push(TrackEvent::PlaybackPositionChanged {
                previous_index,
                current_index: index,
            });
        Ok(())
    }

    /// Rename the track. The name is trimmed; an empty result is rejected.
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyName);
        }
        let old_name = std::mem::replace(&mut self.name, trimmed.to_owned());
        self.pending_events.push(TrackEvent::TrackRenamed {
            old_name,
            new_name: trimmed.to_owned(),
        });
        Ok(())
    }

    /// Stop every playing slot
    pub fn stop_playback(&mut self) {
        for slot in &mut self.slots {
            slot.stop();
        }
    }

    /// Whether any slot holds an animation
    pub fn has_any_animation(&self) -> bool {
        self.slots.iter().any(|s| !s.is_empty())
    }

    /// Take the track's queued events, then each slot's, in order
    pub fn drain_events(&mut self) -> Vec<TrackEvent> {
        let mut events = std::mem::take(&mut self.pending_events);
        for slot in &mut self.slots {
            events.extend(slot.drain_events().into_iter().map(TrackEvent::Slot));
        }
        events
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, slot) in self.slots.iter_mut().enumerate().skip(start) {
            slot.index = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SlotEvent;

    fn track_with(animations: &[Option<&str>]) -> Track {
        let mut track = Track::new("Test");
        track.set_animation(0, animations[0]).unwrap();
        for animation in &animations[1..] {
            track.add_slot(*animation, None).unwrap();
        }
        track.drain_events();
        track
    }

    #[test]
    fn test_new_track_has_one_slot() {
        let track = Track::new("A");
        assert_eq!(track.slot_count(), 1);
        assert_eq!(track.current_slot_index(), 0);
        assert!(track.current_slot().is_empty());
    }

    #[test]
    fn test_add_slot_reindexes() {
        let mut track = track_with(&[Some("a"), Some("c")]);
        track.add_slot(Some("b"), Some(1)).unwrap();
        let indices: Vec<_> = track.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(track.slot(1).unwrap().animation.as_deref(), Some("b"));
        assert_eq!(track.slot(2).unwrap().animation.as_deref(), Some("c"));
    }

    #[test]
    fn test_add_slot_capacity_and_range() {
        let mut track = Track::new("A");
        assert!(matches!(
            track.add_slot(None, Some(5)),
            Err(ModelError::IndexOutOfRange { index: 5, len: 1 })
        ));
        for _ in 1..track.max_slots {
            track.add_slot(None, None).unwrap();
        }
        assert!(matches!(
            track.add_slot(None, None),
            Err(ModelError::Capacity { .. })
        ));
    }

    #[test]
    fn test_last_slot_cannot_be_removed() {
        let mut track = Track::new("A");
        assert!(matches!(track.remove_slot(0), Err(ModelError::LastSlot)));
        assert_eq!(track.slot_count(), 1);
    }

    #[test]
    fn test_remove_slot_clamps_cursor() {
        let mut track = track_with(&[Some("a"), Some("b")]);
        track.set_current_slot(1).unwrap();
        track.remove_slot(1).unwrap();
        assert_eq!(track.slot_count(), 1);
        assert_eq!(track.current_slot_index(), 0);
    }

    #[test]
    fn test_add_then_remove_restores_ordering() {
        let mut track = track_with(&[Some("a"), Some("b"), Some("c")]);
        let before: Vec<_> = track
            .slots()
            .iter()
            .map(|s| s.animation.clone())
            .collect();
        track.add_slot(Some("x"), Some(1)).unwrap();
        track.remove_slot(1).unwrap();
        let after: Vec<_> = track
            .slots()
            .iter()
            .map(|s| s.animation.clone())
            .collect();
        assert_eq!(before, after);
        let indices: Vec<_> = track.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_move_slot_same_index_is_noop() {
        let mut track = track_with(&[Some("a"), Some("b")]);
        track.move_slot(1, 1).unwrap();
        assert!(track.drain_events().is_empty());
        assert_eq!(track.slot(0).unwrap().animation.as_deref(), Some("a"));
    }

    #[test]
    fn test_move_slot_reindexes_fully() {
        let mut track = track_with(&[Some("a"), Some("b"), Some("c")]);
        track.move_slot(2, 0).unwrap();
        let names: Vec<_> = track
            .slots()
            .iter()
            .map(|s| s.animation.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        let indices: Vec<_> = track.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(
            track.drain_events(),
            vec![TrackEvent::SlotMoved {
                from_index: 2,
                to_index: 0
            }]
        );
    }

    #[test]
    fn test_set_current_slot_unchanged_is_silent() {
        let mut track = track_with(&[Some("a"), Some("b")]);
        track.set_current_slot(0).unwrap();
        assert!(track.drain_events().is_empty());

        track.set_current_slot(1).unwrap();
        assert_eq!(
            track.drain_events(),
            vec![TrackEvent::PlaybackPositionChanged {
                previous_index: 0,
                current_index: 1
            }]
        );
    }

    #[test]
    fn test_rename_trims_and_rejects_empty() {
        let mut track = Track::new("Old");
        assert!(matches!(track.rename("   "), Err(ModelError::EmptyName)));
        track.rename("  New  ").unwrap();
        assert_eq!(track.name, "New");
        assert_eq!(
            track.drain_events(),
            vec![TrackEvent::TrackRenamed {
                old_name: "Old".into(),
                new_name: "New".into()
            }]
        );
    }

    #[test]
    fn test_set_animation_orders_slot_events_before_track_event() {
        let mut track = Track::new("A");
        track.set_animation(0, Some("walk")).unwrap();
        let events = track.drain_events();
        assert_eq!(
            events,
            vec![
                TrackEvent::Slot(SlotEvent::AnimationSet {
                    animation: "walk".into(),
                    index: 0
                }),
                TrackEvent::AnimationChanged {
                    slot_index: 0,
                    animation: Some("walk".into())
                },
            ]
        );
    }
}
