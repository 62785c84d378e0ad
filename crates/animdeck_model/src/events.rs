// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed model events.
//!
//! Entities queue events as they mutate; consumers drain them in emission
//! order via `drain_events`. The wire names returned by `name()` are a
//! stable contract with external consumers and must not change.

use crate::track::TrackId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, for request-event timestamps.
pub(crate) fn epoch_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}

/// Event emitted by a single slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotEvent {
    /// An animation reference was assigned
    AnimationSet {
        /// Assigned animation name
        animation: String,
        /// Slot index at emission time
        index: usize,
    },
    /// The animation reference was removed
    AnimationCleared {
        /// Slot index at emission time
        index: usize,
    },
    /// The slot began playing its animation
    PlaybackStarted {
        /// Playing animation name
        animation: String,
        /// Slot index at emission time
        index: usize,
    },
    /// The slot stopped playing
    PlaybackStopped {
        /// Slot index at emission time
        index: usize,
    },
}

impl SlotEvent {
    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnimationSet { .. } => "animation-set",
            Self::AnimationCleared { .. } => "animation-cleared",
            Self::PlaybackStarted { .. } => "playback-started",
            Self::PlaybackStopped { .. } => "playback-stopped",
        }
    }
}

/// Event emitted by a track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    /// A slot was inserted
    SlotAdded {
        /// Insertion index
        index: usize,
        /// Animation assigned at insertion, if any
        animation: Option<String>,
    },
    /// A slot was removed
    SlotRemoved {
        /// Index the slot occupied
        index: usize,
    },
    /// A slot was moved to a new position
    SlotMoved {
        /// Original index
        from_index: usize,
        /// Destination index
        to_index: usize,
    },
    /// A slot's animation reference changed via the track
    AnimationChanged {
        /// Index of the edited slot
        slot_index: usize,
        /// New animation reference
        animation: Option<String>,
    },
    /// The playback cursor moved
    PlaybackPositionChanged {
        /// Previous cursor position
        previous_index: usize,
        /// New cursor position
        current_index: usize,
    },
    /// The track was renamed
    TrackRenamed {
        /// Name before the rename
        old_name: String,
        /// Name after the rename
        new_name: String,
    },
    /// An event bubbled up from one of the track's slots
    Slot(SlotEvent),
}

impl TrackEvent {
    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::SlotAdded { .. } => "slot-added",
            Self::SlotRemoved { .. } => "slot-removed",
            Self::SlotMoved { .. } => "slot-moved",
            Self::AnimationChanged { .. } => "animation-changed",
            Self::PlaybackPositionChanged { .. } => "playback-position-changed",
            Self::TrackRenamed { .. } => "track-renamed",
            Self::Slot(event) => event.name(),
        }
    }
}

/// Event emitted by a sequence
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEvent {
    /// A track was added
    TrackAdded {
        /// Id of the new track
        track_id: TrackId,
    },
    /// A track was removed
    TrackRemoved {
        /// Id of the removed track
        track_id: TrackId,
    },
    /// All tracks were removed
    TracksCleared,
    /// Playback was requested
    PlayRequested {
        /// Epoch milliseconds at request time
        timestamp: f64,
    },
    /// Stop was requested
    StopRequested {
        /// Epoch milliseconds at request time
        timestamp: f64,
    },
    /// Pause was requested
    PauseRequested {
        /// Epoch milliseconds at request time
        timestamp: f64,
    },
    /// Resume was requested
    ResumeRequested {
        /// Epoch milliseconds at request time
        timestamp: f64,
    },
    /// A playback-speed change was requested
    PlaybackSpeedChangeRequested {
        /// Requested speed multiplier
        speed: f64,
        /// Epoch milliseconds at request time
        timestamp: f64,
    },
    /// An event bubbled up from one of the sequence's tracks
    Track {
        /// Id of the originating track
        track_id: TrackId,
        /// The track's event
        event: TrackEvent,
    },
}

impl SequenceEvent {
    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrackAdded { .. } => "track-added",
            Self::TrackRemoved { .. } => "track-removed",
            Self::TracksCleared => "tracks-cleared",
            Self::PlayRequested { .. } => "play-requested",
            Self::StopRequested { .. } => "stop-requested",
            Self::PauseRequested { .. } => "pause-requested",
            Self::ResumeRequested { .. } => "resume-requested",
            Self::PlaybackSpeedChangeRequested { .. } => "playback-speed-change-requested",
            Self::Track { event, .. } => event.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let event = SlotEvent::AnimationSet {
            animation: "walk".into(),
            index: 0,
        };
        assert_eq!(event.name(), "animation-set");

        let event = TrackEvent::PlaybackPositionChanged {
            previous_index: 0,
            current_index: 2,
        };
        assert_eq!(event.name(), "playback-position-changed");

        let event = SequenceEvent::PlaybackSpeedChangeRequested {
            speed: 2.0,
            timestamp: 0.0,
        };
        assert_eq!(event.name(), "playback-speed-change-requested");
    }

    #[test]
    fn test_nested_events_use_inner_name() {
        let event = TrackEvent::Slot(SlotEvent::PlaybackStopped { index: 1 });
        assert_eq!(event.name(), "playback-stopped");

        let event = SequenceEvent::Track {
            track_id: TrackId::new(),
            event: TrackEvent::SlotRemoved { index: 0 },
        };
        assert_eq!(event.name(), "slot-removed");
    }
}
