// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ensemble playback scheduler for AnimDeck.
//!
//! This crate drives a passive [`animdeck_model::Sequence`] against a
//! shared timebase: one frame-callback loop that advances, freezes, and
//! restarts per-track playback positions so every track returns to slot 0
//! at the same instant.
//!
//! ## Architecture
//!
//! - [`PlaybackEngine`] owns the ensemble clock and per-track runtime
//!   state, and consumes three collaborators
//! - [`AnimationRenderer`] renders animations and answers duration lookups
//! - [`FrameScheduler`] registers the single pending tick callback
//! - [`ProgressSink`] receives normalized per-track progress
//!
//! Tracks of different lengths are reconciled into one loop point: the
//! ensemble cycle is bounded by the longest animation across all tracks,
//! and a track that finishes early holds its last frame until the next
//! ensemble restart instead of looping on its own cadence.

pub mod clock;
pub mod collaborators;
pub mod engine;
pub mod events;
pub mod runtime;

pub use clock::EnsembleClock;
pub use collaborators::{
    AnimationRenderer, FrameScheduler, ProgressSink, RenderError, TickHandle,
    DEFAULT_ANIMATION_DURATION_MS,
};
pub use engine::{EngineState, PlaybackEngine};
pub use events::EngineEvent;
pub use runtime::{RuntimeArena, TrackRuntime};
