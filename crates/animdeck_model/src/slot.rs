// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot: one addressable cell of a track.

use crate::error::{ModelError, Result};
use crate::events::SlotEvent;
use serde::{Deserialize, Serialize};

/// A single cell in a track, holding an animation reference or nothing.
///
/// The `index` always matches the slot's position in the owning track's
/// slot list; tracks re-index after every structural edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Position within the owning track
    pub index: usize,
    /// Animation reference, `None` when the slot is empty
    pub animation: Option<String>,
    /// Whether the slot's animation is currently playing
    pub is_playing: bool,
    #[serde(skip)]
    pending_events: Vec<SlotEvent>,
}

impl Slot {
    /// Create a slot at the given index
    pub fn new(index: usize, animation: Option<String>) -> Self {
        Self {
            index,
            animation,
            is_playing: false,
            pending_events: Vec::new(),
        }
    }

    /// Whether the slot holds no animation reference
    pub fn is_empty(&self) -> bool {
        self.animation.is_none()
    }

    /// Assign or clear the animation reference.
    ///
    /// A playing slot is stopped before the reference changes.
    pub fn set_animation(&mut self, animation: Option<&str>) {
        if self.is_playing {
            self.stop();
        }
        self.animation = animation.map(str::to_owned);
        match &self.animation {
            Some(name) => self.pending_events.push(SlotEvent::AnimationSet {
                animation: name.clone(),
                index: self.index,
            }),
            None => self
                .pending_events
                .push(SlotEvent::AnimationCleared { index: self.index }),
        }
    }

    /// Begin playing the slot's animation.
    ///
    /// Fails on an empty slot; a slot that is already playing is left
    /// untouched and emits nothing.
    pub fn play(&mut self) -> Result<()> {
        let Some(animation) = &self.animation else {
            return Err(ModelError::EmptySlot { index: self.index });
        };
        if self.is_playing {
            return Ok(());
        }
        self.is_playing = true;
        self.pending_events.push(SlotEvent::PlaybackStarted {
            animation: animation.clone(),
            index: self.index,
        });
        Ok(())
    }

    /// Stop playing. No-op (no event) if already stopped.
    pub fn stop(&mut self) {
        if !self.is_playing {
            return;
        }
        self.is_playing = false;
        self.pending_events
            .push(SlotEvent::PlaybackStopped { index: self.index });
    }

    /// Take the slot's queued events in emission order
    pub fn drain_events(&mut self) -> Vec<SlotEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_cannot_play() {
        let mut slot = Slot::new(0, None);
        assert!(slot.is_empty());
        assert!(matches!(
            slot.play(),
            Err(ModelError::EmptySlot { index: 0 })
        ));
        assert!(!slot.is_playing);
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut slot = Slot::new(0, Some("walk".into()));
        slot.play().unwrap();
        slot.play().unwrap();

        let events = slot.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "playback-started");
    }

    #[test]
    fn test_stop_when_stopped_emits_nothing() {
        let mut slot = Slot::new(0, Some("walk".into()));
        slot.stop();
        assert!(slot.drain_events().is_empty());
    }

    #[test]
    fn test_set_animation_stops_playback_first() {
        let mut slot = Slot::new(2, Some("walk".into()));
        slot.play().unwrap();
        slot.drain_events();

        slot.set_animation(Some("run"));
        assert!(!slot.is_playing);

        let events = slot.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SlotEvent::PlaybackStopped { index: 2 });
        assert_eq!(
            events[1],
            SlotEvent::AnimationSet {
                animation: "run".into(),
                index: 2
            }
        );
    }

    #[test]
    fn test_clear_animation() {
        let mut slot = Slot::new(1, Some("walk".into()));
        slot.drain_events();
        slot.set_animation(None);
        assert!(slot.is_empty());
        assert_eq!(
            slot.drain_events(),
            vec![SlotEvent::AnimationCleared { index: 1 }]
        );
    }
}
