// SPDX-License-Identifier: MIT OR Apache-2.0
//! The ensemble clock: one shared timebase per engine instance.

/// Engine-owned clock state, all values in milliseconds.
///
/// `elapsed_time` accumulates speed-scaled deltas; `cycle_start_time`
/// marks the last ensemble restart. Deltas are integrated as-is, never
/// clamped: clamping a pathologically large delta (a backgrounded host)
/// would desynchronize `elapsed_time` against `cycle_start_time`.
#[derive(Debug, Clone, Default)]
pub struct EnsembleClock {
    /// Speed-scaled time accumulated since `start`
    pub elapsed_time: f64,
    /// Host timestamp of the previous tick, `None` right after start or resume
    pub last_timestamp: Option<f64>,
    /// `elapsed_time` value at the last ensemble restart
    pub cycle_start_time: f64,
    /// Length of the current ensemble cycle
    pub longest_animation_duration: f64,
}

impl EnsembleClock {
    /// Reset everything to the pre-start state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Integrate one host timestamp, returning the raw delta.
    ///
    /// The first tick after start or resume sees no previous timestamp
    /// and integrates a zero delta, so wall-clock gaps across a pause
    /// never reach `elapsed_time`.
    pub fn advance(&mut self, timestamp: f64, playback_speed: f64) -> f64 {
        let delta = self
            .last_timestamp
            .map(|last| timestamp - last)
            .unwrap_or(0.0);
        self.last_timestamp = Some(timestamp);
        self.elapsed_time += delta * playback_speed;
        delta
    }

    /// Time elapsed in the current ensemble cycle
    pub fn cycle_time(&self) -> f64 {
        self.elapsed_time - self.cycle_start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_delta_is_zero() {
        let mut clock = EnsembleClock::default();
        assert_eq!(clock.advance(5000.0, 1.0), 0.0);
        assert_eq!(clock.elapsed_time, 0.0);
        assert_eq!(clock.advance(5016.0, 1.0), 16.0);
        assert_eq!(clock.elapsed_time, 16.0);
    }

    #[test]
    fn test_speed_scales_accumulation() {
        let mut clock = EnsembleClock::default();
        clock.advance(0.0, 2.0);
        clock.advance(16.0, 2.0);
        assert_eq!(clock.elapsed_time, 32.0);
    }

    #[test]
    fn test_resume_gap_not_integrated() {
        let mut clock = EnsembleClock::default();
        clock.advance(0.0, 1.0);
        clock.advance(100.0, 1.0);
        // Pause: the engine clears the timestamp; a long real-time gap follows
        clock.last_timestamp = None;
        clock.advance(90_000.0, 1.0);
        assert_eq!(clock.elapsed_time, 100.0);
    }

    #[test]
    fn test_cycle_time() {
        let mut clock = EnsembleClock::default();
        clock.advance(0.0, 1.0);
        clock.advance(300.0, 1.0);
        clock.cycle_start_time = 200.0;
        assert_eq!(clock.cycle_time(), 100.0);
    }
}
