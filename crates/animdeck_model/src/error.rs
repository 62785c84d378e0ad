// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the AnimDeck model.

use crate::track::TrackId;
use thiserror::Error;

/// Errors raised by model mutations and transport preconditions.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Playback was requested on a slot with no animation assigned
    #[error("slot {index} is empty")]
    EmptySlot {
        /// Index of the empty slot
        index: usize,
    },

    /// A capacity limit was reached
    #[error("capacity limit reached ({limit})")]
    Capacity {
        /// The configured limit
        limit: usize,
    },

    /// An index was outside the valid range
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Current collection length
        len: usize,
    },

    /// The last slot of a track cannot be removed
    #[error("cannot remove the last slot of a track")]
    LastSlot,

    /// The last track of a sequence cannot be removed
    #[error("cannot remove the last track of a sequence")]
    LastTrack,

    /// No track with the given id exists
    #[error("track not found: {0:?}")]
    TrackNotFound(TrackId),

    /// A track name was empty after trimming
    #[error("track name is empty")]
    EmptyName,

    /// A track name exceeded the maximum length
    #[error("track name too long ({len} > {max})")]
    NameTooLong {
        /// Length of the rejected name
        len: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// A track name collided with an existing track
    #[error("track name already in use: {0}")]
    DuplicateName(String),

    /// Playback was requested on a sequence with no tracks
    #[error("sequence has no tracks")]
    EmptySequence,

    /// Pause was requested while not playing
    #[error("not playing")]
    NotPlaying,

    /// Resume was requested while not paused
    #[error("not paused")]
    NotPaused,

    /// A playback speed was not a finite positive number
    #[error("invalid playback speed: {0}")]
    InvalidSpeed(f64),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
