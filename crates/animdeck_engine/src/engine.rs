// SPDX-License-Identifier: MIT OR Apache-2.0
//! The playback engine: the ensemble scheduling core.
//!
//! The engine consumes a passive [`Sequence`] and a rendering
//! collaborator, owns the ephemeral per-track runtime state and the
//! ensemble clock, and drives one frame-callback loop. All tracks share
//! a single cycle bounded by the longest animation: a track that
//! finishes early freezes on its last frame and every track returns to
//! slot 0 at the same instant. Independent per-track looping was
//! rejected because tracks drift out of phase across cycles, defeating
//! layered review.

use crate::clock::EnsembleClock;
use crate::collaborators::{
    AnimationRenderer, FrameScheduler, ProgressSink, TickHandle, DEFAULT_ANIMATION_DURATION_MS,
};
use crate::events::{epoch_millis, EngineEvent};
use crate::runtime::{RuntimeArena, TrackRuntime};
use animdeck_model::{LoopMode, Result, Sequence, Slot, Track, TrackId};

/// Engine transport state.
///
/// `Stopped → Playing → Paused → Playing → Stopped`; Paused is
/// reachable only from Playing, Playing only from Stopped or Paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No runtime state exists
    #[default]
    Stopped,
    /// The tick loop is running
    Playing,
    /// Runtime state is retained, the tick loop is suspended
    Paused,
}

/// The multi-track playback scheduler.
///
/// Transport entry points are idempotent no-ops when the requested
/// transition is redundant; the model throws in those cases, the engine
/// tolerates. That asymmetry is deliberate.
pub struct PlaybackEngine<R, S>
where
    R: AnimationRenderer,
    S: FrameScheduler,
{
    renderer: R,
    scheduler: S,
    progress: Option<Box<dyn ProgressSink>>,
    state: EngineState,
    clock: EnsembleClock,
    runtime: RuntimeArena,
    pause_after_tick: bool,
    saved_time_scale: f64,
    scheduled: Option<TickHandle>,
    next_handle: u64,
    pending_events: Vec<EngineEvent>,
}

impl<R, S> PlaybackEngine<R, S>
where
    R: AnimationRenderer,
    S: FrameScheduler,
{
    /// Create an engine around a renderer and a frame scheduler
    pub fn new(renderer: R, scheduler: S) -> Self {
        Self {
            renderer,
            scheduler,
            progress: None,
            state: EngineState::Stopped,
            clock: EnsembleClock::default(),
            runtime: RuntimeArena::new(),
            pause_after_tick: false,
            saved_time_scale: 1.0,
            scheduled: None,
            next_handle: 0,
            pending_events: Vec::new(),
        }
    }

    /// Attach a progress collaborator
    pub fn set_progress_sink(&mut self, sink: Box<dyn ProgressSink>) {
        self.progress = Some(sink);
    }

    /// Current transport state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether the tick loop is running
    pub fn is_playing(&self) -> bool {
        self.state == EngineState::Playing
    }

    /// The ensemble clock
    pub fn clock(&self) -> &EnsembleClock {
        &self.clock
    }

    /// The per-track runtime arena
    pub fn runtime(&self) -> &RuntimeArena {
        &self.runtime
    }

    /// The rendering collaborator
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The frame scheduler
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Handle of the pending tick, if one is scheduled
    pub fn scheduled_tick(&self) -> Option<TickHandle> {
        self.scheduled
    }

    /// Take the engine's queued notifications in emission order
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Begin playback from the stopped state.
    ///
    /// No-op if not stopped; no-op (not an error) on a sequence with
    /// zero tracks.
    pub fn start(&mut self, seq: &mut Sequence) {
        if self.state != EngineState::Stopped {
            tracing::debug!("start ignored: engine not stopped");
            return;
        }
        if seq.track_count() == 0 {
            tracing::debug!("start ignored: sequence has no tracks");
            return;
        }
        self.runtime.clear();
        self.clock.reset();
        let mut longest = 0.0_f64;
        for track_index in 0..seq.track_count() {
            let runtime =
                self.init_track_runtime(&mut seq.tracks_mut()[track_index], track_index, 0.0);
            longest = longest.max(runtime.animation_duration);
            self.runtime.insert(seq.tracks()[track_index].id, runtime);
        }
        self.clock.longest_animation_duration = longest;
        self.renderer.set_time_scale(seq.playback.playback_speed);
        seq.playback.is_playing = true;
        seq.playback.is_paused = false;
        seq.playback.current_time = 0.0;
        self.state = EngineState::Playing;
        self.pause_after_tick = false;
        self.schedule_tick();
        self.pending_events.push(EngineEvent::PlaybackStarted);
        tracing::info!(tracks = seq.track_count(), cycle_ms = longest, "playback started");
    }

    /// Stop playback, discarding all runtime state. No-op if stopped.
    pub fn stop(&mut self, seq: &mut Sequence) {
        if self.state == EngineState::Stopped {
            return;
        }
        self.cancel_pending_tick();
        for track in seq.tracks_mut() {
            track.stop_playback();
            let _ = track.set_current_slot(0);
        }
        self.runtime.clear();
        self.clock.reset();
        self.renderer.stop_all();
        seq.playback.is_playing = false;
        seq.playback.is_paused = false;
        seq.playback.current_time = 0.0;
        self.state = EngineState::Stopped;
        self.pause_after_tick = false;
        self.pending_events.push(EngineEvent::PlaybackStopped);
        tracing::info!("playback stopped");
    }

    /// Pause playback, keeping runtime state resumable. No-op unless
    /// playing.
    pub fn pause(&mut self, seq: &mut Sequence) {
        if self.state != EngineState::Playing {
            return;
        }
        self.cancel_pending_tick();
        self.saved_time_scale = self.renderer.time_scale();
        self.renderer.set_time_scale(0.0);
        seq.playback.is_paused = true;
        self.state = EngineState::Paused;
        self.pending_events.push(EngineEvent::PlaybackPaused);
        tracing::info!("playback paused");
    }

    /// Resume from pause. No-op unless paused.
    ///
    /// The clock's previous timestamp is cleared so the first
    /// post-resume delta is zero and the pause gap is never integrated.
    pub fn resume(&mut self, seq: &mut Sequence) {
        if self.state != EngineState::Paused {
            return;
        }
        self.renderer.set_time_scale(self.saved_time_scale);
        self.clock.last_timestamp = None;
        seq.playback.is_paused = false;
        self.state = EngineState::Playing;
        self.schedule_tick();
        self.pending_events.push(EngineEvent::PlaybackResumed);
        tracing::info!("playback resumed");
    }

    /// Set the playback speed.
    ///
    /// Speed scales delta accumulation, never the stored durations, so
    /// slot-boundary arithmetic stays speed-invariant. The renderer's
    /// global time-scale follows the speed (deferred while paused).
    pub fn set_playback_speed(&mut self, seq: &mut Sequence, speed: f64) -> Result<()> {
        seq.set_playback_speed(speed)?;
        if self.state == EngineState::Paused {
            self.saved_time_scale = speed;
        } else {
            self.renderer.set_time_scale(speed);
        }
        self.pending_events.push(EngineEvent::PlaybackSpeedChanged {
            speed,
            timestamp: epoch_millis(),
        });
        Ok(())
    }

    /// Advance exactly one frame, then pause.
    ///
    /// Starts a stopped engine, resumes a paused one, and restores all
    /// time-scales to 1 so the stepped frame renders motion even on
    /// frozen tracks.
    pub fn step_frame(&mut self, seq: &mut Sequence) {
        match self.state {
            EngineState::Stopped => self.start(seq),
            EngineState::Paused => self.resume(seq),
            EngineState::Playing => {}
        }
        if self.state != EngineState::Playing {
            return;
        }
        for track_index in 0..seq.track_count() {
            self.renderer.set_track_time_scale(track_index, 1.0);
        }
        self.renderer.set_time_scale(1.0);
        self.pause_after_tick = true;
    }

    /// One invocation of the per-frame update.
    ///
    /// `timestamp` is the host's monotonic time in milliseconds. Ticks
    /// arriving under a stale handle are rejected, so a callback that
    /// raced a stop-then-start cannot touch the new run.
    pub fn tick(&mut self, seq: &mut Sequence, handle: TickHandle, timestamp: f64) {
        if self.state != EngineState::Playing {
            return;
        }
        if self.scheduled != Some(handle) {
            tracing::debug!(?handle, "stale tick ignored");
            return;
        }
        self.scheduled = None;

        // Tracks removed mid-playback leave stale runtime records behind
        self.runtime.retain(|id| seq.track(id).is_some());

        let speed = seq.playback.playback_speed;
        self.clock.advance(timestamp, speed);
        seq.playback.current_time = self.clock.elapsed_time;

        if self.clock.cycle_time() >= self.clock.longest_animation_duration {
            if seq.playback.loop_mode == LoopMode::Once {
                self.stop(seq);
                return;
            }
            self.restart_all(seq, timestamp);
        }

        for track_index in 0..seq.track_count() {
            self.update_track(seq, track_index);
        }

        if self.pause_after_tick {
            self.pause_after_tick = false;
            self.pause(seq);
            return;
        }

        if self.state == EngineState::Playing {
            self.schedule_tick();
        }
    }

    /// Ensemble restart: every track back to slot 0 at the same instant.
    fn restart_all(&mut self, seq: &mut Sequence, timestamp: f64) {
        let elapsed = self.clock.elapsed_time;
        let mut longest = 0.0_f64;
        for track_index in 0..seq.track_count() {
            let runtime =
                self.init_track_runtime(&mut seq.tracks_mut()[track_index], track_index, elapsed);
            longest = longest.max(runtime.animation_duration);
            let track_id = seq.tracks()[track_index].id;
            self.runtime.insert(track_id, runtime);
            self.pending_events.push(EngineEvent::TrackLoop { track_id });
        }
        self.clock.longest_animation_duration = longest;
        self.clock.cycle_start_time = elapsed;
        self.pending_events
            .push(EngineEvent::AllTracksRestarted { timestamp });
        tracing::debug!(cycle_ms = longest, "ensemble restart");
    }

    /// Reset a track to slot 0 and build its runtime record.
    fn init_track_runtime(
        &mut self,
        track: &mut Track,
        track_index: usize,
        start_time: f64,
    ) -> TrackRuntime {
        track.stop_playback();
        let _ = track.set_current_slot(0);
        self.renderer.set_track_time_scale(track_index, 1.0);
        let duration = slot_duration(&self.renderer, track.current_slot());
        let runtime = TrackRuntime::new(start_time, duration);
        if !track.current_slot().is_empty() {
            start_slot_animation(&mut self.renderer, track, 0, track_index, runtime.is_looping);
        }
        runtime
    }

    /// Per-track update, one call per tick per track.
    fn update_track(&mut self, seq: &mut Sequence, track_index: usize) {
        let elapsed = self.clock.elapsed_time;
        let track = &mut seq.tracks_mut()[track_index];
        if !track.is_active {
            return;
        }
        let track_id = track.id;

        // A track added mid-playback gets its record lazily and sits
        // out the rest of this tick
        if !self.runtime.contains(track_id) {
            let runtime = self.init_track_runtime(track, track_index, elapsed);
            self.runtime.insert(track_id, runtime);
            return;
        }

        if self.runtime.get(track_id).is_some_and(|r| r.is_frozen) {
            // A frozen track holds its last frame; keep the sink pinned
            if let Some(sink) = &mut self.progress {
                sink.progress(track_index, 1.0);
            }
            return;
        }

        let current = track.current_slot_index();
        if track.current_slot().is_empty() {
            self.advance_past_empty(track, track_index, current, elapsed);
            return;
        }

        let Some((slot_start, duration)) = self
            .runtime
            .get(track_id)
            .map(|r| (r.slot_start_time, r.animation_duration))
        else {
            return;
        };
        let time_in_slot = elapsed - slot_start;
        if let Some(sink) = &mut self.progress {
            sink.progress(track_index, time_in_slot.min(duration) / duration);
        }
        if time_in_slot < duration {
            return;
        }

        if current + 1 < track.slot_count() {
            // Slot finished with more to play: advance on the exact
            // boundary so later slots keep cadence regardless of tick
            // timing
            let next = current + 1;
            if let Some(slot) = track.slot_mut(current) {
                slot.stop();
            }
            let _ = track.set_current_slot(next);
            let next_duration = slot_duration(&self.renderer, track.current_slot());
            start_slot_animation(&mut self.renderer, track, next, track_index, false);
            if let Some(runtime) = self.runtime.get_mut(track_id) {
                runtime.current_slot = next;
                runtime.slot_start_time = slot_start + duration;
                runtime.animation_duration = next_duration;
            }
        } else {
            // Last slot finished early: hold the final frame until the
            // next ensemble restart
            self.freeze_track(track_id, track_index, true);
        }
    }

    /// Handle a cursor sitting on an empty slot.
    fn advance_past_empty(
        &mut self,
        track: &mut Track,
        track_index: usize,
        current: usize,
        elapsed: f64,
    ) {
        let track_id = track.id;
        let len = track.slot_count();
        let mut found = None;
        for step in 1..len {
            let candidate = (current + step) % len;
            if track.slot(candidate).is_some_and(|s| !s.is_empty()) {
                found = Some(candidate);
                break;
            }
        }
        match found {
            Some(next) if next > current => {
                let _ = track.set_current_slot(next);
                let duration = slot_duration(&self.renderer, track.current_slot());
                start_slot_animation(&mut self.renderer, track, next, track_index, false);
                if let Some(runtime) = self.runtime.get_mut(track_id) {
                    runtime.current_slot = next;
                    runtime.slot_start_time = elapsed;
                    runtime.animation_duration = duration;
                    runtime.is_frozen = false;
                }
            }
            Some(_) => {
                // The nearest playable slot is behind the cursor; this
                // pass is complete, freezing beats looping out of phase
                self.freeze_track(track_id, track_index, false);
            }
            None => {
                // Whole track empty: park it without a cursor move,
                // reporting once per cycle
                if let Some(runtime) = self.runtime.get_mut(track_id) {
                    if !runtime.reported_empty {
                        runtime.reported_empty = true;
                        self.pending_events.push(EngineEvent::EmptySlotEncountered {
                            track_id,
                            slot_index: current,
                        });
                    }
                }
            }
        }
    }

    /// Zero a track's render time-scale and mark it frozen.
    fn freeze_track(&mut self, track_id: TrackId, track_index: usize, pin_to_end: bool) {
        self.renderer.set_track_time_scale(track_index, 0.0);
        if pin_to_end {
            self.renderer.seek_track_to_end(track_index);
        }
        if let Some(runtime) = self.runtime.get_mut(track_id) {
            runtime.is_frozen = true;
        }
        tracing::debug!(?track_id, "track frozen until ensemble restart");
    }

    fn schedule_tick(&mut self) {
        self.next_handle += 1;
        let handle = TickHandle(self.next_handle);
        self.scheduled = Some(handle);
        self.scheduler.schedule(handle);
    }

    fn cancel_pending_tick(&mut self) {
        if let Some(handle) = self.scheduled.take() {
            self.scheduler.cancel(handle);
        }
    }
}

/// Duration of a slot's animation, with the logged default fallback.
fn slot_duration<R: AnimationRenderer>(renderer: &R, slot: &Slot) -> f64 {
    let Some(name) = &slot.animation else {
        return DEFAULT_ANIMATION_DURATION_MS;
    };
    match renderer.animation_duration_ms(name) {
        Some(duration) if duration > 0.0 => duration,
        Some(duration) => {
            tracing::warn!(animation = %name, duration, "non-positive duration, using default");
            DEFAULT_ANIMATION_DURATION_MS
        }
        None => {
            tracing::warn!(animation = %name, "duration lookup failed, using default");
            DEFAULT_ANIMATION_DURATION_MS
        }
    }
}

/// Start a slot's animation on the model and the renderer.
///
/// Render failures are logged and swallowed; one track's failure never
/// desynchronizes the ensemble.
fn start_slot_animation<R: AnimationRenderer>(
    renderer: &mut R,
    track: &mut Track,
    slot_index: usize,
    track_index: usize,
    looping: bool,
) {
    let Some(slot) = track.slot_mut(slot_index) else {
        return;
    };
    let Some(name) = slot.animation.clone() else {
        return;
    };
    if slot.play().is_err() {
        return;
    }
    if let Err(err) = renderer.set_animation(&name, looping, track_index) {
        tracing::warn!(
            animation = %name,
            track = track_index,
            error = %err,
            "renderer failed to start animation"
        );
    }
}
