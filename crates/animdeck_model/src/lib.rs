// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data model for AnimDeck ensemble playback.
//!
//! This crate provides the persistent model an operator edits:
//! - Slots: addressable cells holding an animation reference or nothing
//! - Tracks: ordered slot lists with a playback cursor
//! - Sequences: the full track ensemble plus playback metadata
//! - A registry facade enforcing name and capacity rules
//!
//! ## Architecture
//!
//! The model is passive: transport methods on [`Sequence`] validate
//! preconditions and queue request events, but never drive time. The
//! scheduler that consumes this model lives in `animdeck_engine`.

pub mod error;
pub mod events;
pub mod registry;
pub mod sequence;
pub mod slot;
pub mod track;

pub use error::{ModelError, Result};
pub use events::{SequenceEvent, SlotEvent, TrackEvent};
pub use registry::MAX_TRACK_NAME_LEN;
pub use sequence::{LoopMode, PlaybackState, Sequence, DEFAULT_MAX_TRACKS};
pub use slot::Slot;
pub use track::{Track, TrackId, DEFAULT_MAX_SLOTS, DEFAULT_MIN_SLOTS};
