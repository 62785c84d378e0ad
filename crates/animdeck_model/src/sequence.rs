// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence: the full track ensemble plus playback metadata.
//!
//! The sequence is a passive record. Its transport methods validate
//! preconditions and queue request events; the engine in
//! `animdeck_engine` is what actually drives time.

use crate::error::{ModelError, Result};
use crate::events::{epoch_millis, SequenceEvent};
use crate::track::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Default upper bound on tracks per sequence
pub const DEFAULT_MAX_TRACKS: usize = 8;

/// How the engine treats the end of an ensemble cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Restart every track at the cycle boundary
    #[default]
    Loop,
    /// Stop playback at the cycle boundary
    Once,
}

/// Ensemble-wide playback metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Whether the engine is driving this sequence
    pub is_playing: bool,
    /// Whether playback is paused (only meaningful while playing)
    pub is_paused: bool,
    /// Engine-mirrored elapsed time in milliseconds
    pub current_time: f64,
    /// Cycle-boundary behavior
    pub loop_mode: LoopMode,
    /// Speed multiplier applied to time accumulation
    pub playback_speed: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_paused: false,
            current_time: 0.0,
            loop_mode: LoopMode::Loop,
            playback_speed: 1.0,
        }
    }
}

/// The aggregate owning all tracks plus ensemble playback metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    /// Upper bound on track count
    pub max_tracks: usize,
    /// Ensemble playback metadata
    pub playback: PlaybackState,
    tracks: Vec<Track>,
    #[serde(skip)]
    pending_events: Vec<SequenceEvent>,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self {
            max_tracks: DEFAULT_MAX_TRACKS,
            playback: PlaybackState::default(),
            tracks: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Get all tracks
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Get all tracks mutably
    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Get a track by id
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Get a mutable track by id
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Append a new track, auto-named `Track N` when no name is given.
    ///
    /// Name validation (trimming, uniqueness, length) lives in the
    /// registry facade; this only enforces capacity.
    pub fn add_track(&mut self, name: Option<&str>) -> Result<TrackId> {
        if self.tracks.len() >= self.max_tracks {
            return Err(ModelError::Capacity {
                limit: self.max_tracks,
            });
        }
        let name = match name {
            Some(name) => name.to_owned(),
            None => format!("Track {}", self.tracks.len() + 1),
        };
        let track = Track::new(name);
        let track_id = track.id;
        self.tracks.push(track);
        self.pending_events
            .push(SequenceEvent::TrackAdded { track_id });
        Ok(track_id)
    }

    /// Remove a track by id.
    ///
    /// The last remaining track cannot be removed. Removal forces the
    /// playing flag off; the engine prunes its runtime record on the
    /// next tick.
    pub fn remove_track(&mut self, id: TrackId) -> Result<Track> {
        if self.tracks.len() <= 1 {
            return Err(ModelError::LastTrack);
        }
        let Some(position) = self.tracks.iter().position(|t| t.id == id) else {
            return Err(ModelError::TrackNotFound(id));
        };
        let track = self.tracks.remove(position);
        self.playback.is_playing = false;
        self.pending_events
            .push(SequenceEvent::TrackRemoved { track_id: id });
        Ok(track)
    }

    /// Remove every track and reset playback state to idle
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.playback = PlaybackState::default();
        self.pending_events.push(SequenceEvent::TracksCleared);
    }

    /// Request playback. Fails on a sequence with no tracks.
    pub fn play(&mut self) -> Result<()> {
        if self.tracks.is_empty() {
            return Err(ModelError::EmptySequence);
        }
        tracing::debug!(tracks = self.tracks.len(), "play requested");
        self.pending_events.push(SequenceEvent::PlayRequested {
            timestamp: epoch_millis(),
        });
        Ok(())
    }

    /// Request a stop. Always succeeds.
    pub fn stop(&mut self) {
        tracing::debug!("stop requested");
        self.pending_events.push(SequenceEvent::StopRequested {
            timestamp: epoch_millis(),
        });
    }

    /// Request a pause. Fails unless playing.
    pub fn pause(&mut self) -> Result<()> {
        if !self.playback.is_playing {
            return Err(ModelError::NotPlaying);
        }
        self.pending_events.push(SequenceEvent::PauseRequested {
            timestamp: epoch_millis(),
        });
        Ok(())
    }

    /// Request a resume. Fails unless paused.
    pub fn resume(&mut self) -> Result<()> {
        if !self.playback.is_paused {
            return Err(ModelError::NotPaused);
        }
        self.pending_events.push(SequenceEvent::ResumeRequested {
            timestamp: epoch_millis(),
        });
        Ok(())
    }

    /// Set the playback speed multiplier.
    ///
    /// The request event is emitted on every call, even when the value
    /// is unchanged.
    pub fn set_playback_speed(&mut self, speed: f64) -> Result<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ModelError::InvalidSpeed(speed));
        }
        tracing::debug!(speed, "playback speed change requested");
        self.playback.playback_speed = speed;
        self.pending_events
            .push(SequenceEvent::PlaybackSpeedChangeRequested {
                speed,
                timestamp: epoch_millis(),
            });
        Ok(())
    }

    /// Take the sequence's queued events, then each track's, in order
    pub fn drain_events(&mut self) -> Vec<SequenceEvent> {
        let mut events = std::mem::take(&mut self.pending_events);
        for track in &mut self.tracks {
            let track_id = track.id;
            events.extend(
                track
                    .drain_events()
                    .into_iter()
                    .map(|event| SequenceEvent::Track { track_id, event }),
            );
        }
        events
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_named_tracks() {
        let mut seq = Sequence::new();
        seq.add_track(None).unwrap();
        seq.add_track(None).unwrap();
        let names: Vec<_> = seq.tracks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Track 1", "Track 2"]);
    }

    #[test]
    fn test_track_capacity() {
        let mut seq = Sequence::new();
        for _ in 0..seq.max_tracks {
            seq.add_track(None).unwrap();
        }
        assert!(matches!(
            seq.add_track(None),
            Err(ModelError::Capacity { .. })
        ));
    }

    #[test]
    fn test_last_track_cannot_be_removed() {
        let mut seq = Sequence::new();
        let id = seq.add_track(None).unwrap();
        assert!(matches!(seq.remove_track(id), Err(ModelError::LastTrack)));
        assert_eq!(seq.track_count(), 1);
    }

    #[test]
    fn test_remove_track_forces_playing_off() {
        let mut seq = Sequence::new();
        let id = seq.add_track(None).unwrap();
        seq.add_track(None).unwrap();
        seq.playback.is_playing = true;
        seq.remove_track(id).unwrap();
        assert!(!seq.playback.is_playing);
        assert!(matches!(
            seq.remove_track(id),
            Err(ModelError::TrackNotFound(_))
        ));
    }

    #[test]
    fn test_play_on_empty_sequence_fails() {
        let mut seq = Sequence::new();
        assert!(matches!(seq.play(), Err(ModelError::EmptySequence)));
    }

    #[test]
    fn test_pause_resume_preconditions() {
        let mut seq = Sequence::new();
        seq.add_track(None).unwrap();
        assert!(matches!(seq.pause(), Err(ModelError::NotPlaying)));
        assert!(matches!(seq.resume(), Err(ModelError::NotPaused)));

        seq.playback.is_playing = true;
        seq.pause().unwrap();
        seq.playback.is_paused = true;
        seq.resume().unwrap();
    }

    #[test]
    fn test_speed_validation() {
        let mut seq = Sequence::new();
        assert!(matches!(
            seq.set_playback_speed(-1.0),
            Err(ModelError::InvalidSpeed(_))
        ));
        assert!(matches!(
            seq.set_playback_speed(0.0),
            Err(ModelError::InvalidSpeed(_))
        ));
        assert!(matches!(
            seq.set_playback_speed(f64::NAN),
            Err(ModelError::InvalidSpeed(_))
        ));
        seq.set_playback_speed(2.0).unwrap();
        assert_eq!(seq.playback.playback_speed, 2.0);
    }

    #[test]
    fn test_speed_request_not_deduplicated() {
        let mut seq = Sequence::new();
        seq.set_playback_speed(1.5).unwrap();
        seq.set_playback_speed(1.5).unwrap();
        let speed_events = seq
            .drain_events()
            .into_iter()
            .filter(|e| e.name() == "playback-speed-change-requested")
            .count();
        assert_eq!(speed_events, 2);
    }

    #[test]
    fn test_clear_resets_playback_state() {
        let mut seq = Sequence::new();
        seq.add_track(None).unwrap();
        seq.playback.is_playing = true;
        seq.playback.current_time = 1234.0;
        seq.clear();
        assert_eq!(seq.track_count(), 0);
        assert!(!seq.playback.is_playing);
        assert_eq!(seq.playback.current_time, 0.0);
        assert_eq!(
            seq.drain_events().last().map(SequenceEvent::name),
            Some("tracks-cleared")
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut seq = Sequence::new();
        let id = seq.add_track(Some("Hero")).unwrap();
        seq.track_mut(id)
            .unwrap()
            .set_animation(0, Some("walk"))
            .unwrap();

        let text = ron::ser::to_string_pretty(&seq, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: Sequence = ron::from_str(&text).unwrap();
        assert_eq!(loaded.track_count(), 1);
        assert_eq!(loaded.tracks()[0].name, "Hero");
        assert_eq!(
            loaded.tracks()[0].slot(0).unwrap().animation.as_deref(),
            Some("walk")
        );
    }
}
