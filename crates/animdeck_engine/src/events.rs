// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine notifications.
//!
//! Drained by the progress/UI collaborator alongside the model's event
//! queues. Per-track cursor moves are not duplicated here: the engine
//! drives them through `Track::set_current_slot`, which queues the
//! `playback-position-changed` event on the model side.

use animdeck_model::TrackId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, for notification timestamps.
pub(crate) fn epoch_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}

/// Notification emitted by the playback engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Playback started from the stopped state
    PlaybackStarted,
    /// Playback stopped and all runtime state was discarded
    PlaybackStopped,
    /// Playback paused, runtime state retained
    PlaybackPaused,
    /// Playback resumed from pause
    PlaybackResumed,
    /// A track returned to slot 0 at an ensemble restart
    TrackLoop {
        /// The looping track
        track_id: TrackId,
    },
    /// A track has no playable slot anywhere
    EmptySlotEncountered {
        /// The parked track
        track_id: TrackId,
        /// The cursor position when the scan gave up
        slot_index: usize,
    },
    /// Every track was reset to slot 0 simultaneously
    AllTracksRestarted {
        /// Host timestamp of the restarting tick
        timestamp: f64,
    },
    /// The playback speed changed
    PlaybackSpeedChanged {
        /// New speed multiplier
        speed: f64,
        /// Epoch milliseconds at the change
        timestamp: f64,
    },
}

impl EngineEvent {
    /// Wire name of this notification
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlaybackStarted => "playback-started",
            Self::PlaybackStopped => "playback-stopped",
            Self::PlaybackPaused => "playback-paused",
            Self::PlaybackResumed => "playback-resumed",
            Self::TrackLoop { .. } => "track-loop",
            Self::EmptySlotEncountered { .. } => "empty-slot-encountered",
            Self::AllTracksRestarted { .. } => "all-tracks-restarted",
            Self::PlaybackSpeedChanged { .. } => "playback-speed-changed",
        }
    }
}
