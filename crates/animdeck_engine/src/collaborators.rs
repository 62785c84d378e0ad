// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collaborator traits the engine consumes.
//!
//! Rendering, frame scheduling, and progress reporting are external
//! concerns. The engine talks to them through these traits and stays
//! correct when any of them misbehaves: a render failure is logged and
//! swallowed, never allowed to desynchronize the ensemble.

use thiserror::Error;

/// Duration assumed when the renderer cannot answer a lookup, in ms
pub const DEFAULT_ANIMATION_DURATION_MS: f64 = 1000.0;

/// Identity of one scheduled tick callback.
///
/// The engine hands a fresh handle to the scheduler for every tick it
/// requests and rejects ticks arriving under a stale handle, so a
/// callback cancelled by a rapid stop-then-start can never mutate the
/// new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Errors a rendering collaborator may report
#[derive(Debug, Error)]
pub enum RenderError {
    /// The named animation does not exist in the loaded asset
    #[error("animation not found: {0}")]
    AnimationNotFound(String),
    /// Any other backend failure
    #[error("renderer failure: {0}")]
    Backend(String),
}

/// Rendering collaborator: plays animations and answers duration lookups.
///
/// Time-scales are multipliers on the renderer's own clock; the engine
/// zeroes a track's scale to freeze it and zeroes the global scale while
/// paused. Implementations must treat all methods as cheap, per-frame
/// calls.
pub trait AnimationRenderer {
    /// Start playing `name` on the given track
    fn set_animation(
        &mut self,
        name: &str,
        looping: bool,
        track_index: usize,
    ) -> Result<(), RenderError>;

    /// Halt every playing animation
    fn stop_all(&mut self);

    /// Current global time-scale
    fn time_scale(&self) -> f64;

    /// Set the global time-scale
    fn set_time_scale(&mut self, scale: f64);

    /// Current time-scale of one track
    fn track_time_scale(&self, track_index: usize) -> f64;

    /// Set the time-scale of one track
    fn set_track_time_scale(&mut self, track_index: usize, scale: f64);

    /// Pin a track's animation to its final frame
    fn seek_track_to_end(&mut self, track_index: usize);

    /// Duration of the named animation in ms, if known
    fn animation_duration_ms(&self, name: &str) -> Option<f64>;
}

/// Host frame-callback registration.
///
/// At most one tick is outstanding at any time; `cancel` must take
/// effect synchronously.
pub trait FrameScheduler {
    /// Request that the host invoke a tick under this handle
    fn schedule(&mut self, handle: TickHandle);

    /// Withdraw a previously scheduled tick
    fn cancel(&mut self, handle: TickHandle);
}

/// Consumer of normalized per-track playback progress
pub trait ProgressSink {
    /// Report progress in `[0, 1]` for the track's current slot
    fn progress(&mut self, track_index: usize, normalized: f64);
}
