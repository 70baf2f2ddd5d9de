//! Breathing session state machine.
//!
//! The machine knows nothing about timers: an external scheduler calls
//! [`BreathingMachine::tick`] with the time that passed since the last call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::phase::{Phase, PhaseDurations};
use crate::error::Result;

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingSnapshot {
    pub phase: Phase,
    pub instruction: String,
    /// Seconds spent in the current phase.
    pub elapsed: f64,
    /// Length of the current phase in seconds.
    pub phase_duration: f64,
    pub remaining: f64,
    /// `elapsed / phase_duration`, always in `[0, 1)`.
    pub progress: f64,
    /// Size of the breathing orb in `[0, 1]`: grows on inhale, stays full on
    /// hold, shrinks on exhale, empty on rest.
    pub expansion: f64,
    pub completed_cycles: u32,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct BreathingMachine {
    durations: PhaseDurations,
    first_phase: Phase,
    phase: Phase,
    elapsed_us: u64,
    completed_cycles: u32,
    active: bool,
}

impl Default for BreathingMachine {
    fn default() -> Self {
        Self::with_table(PhaseDurations::default(), Phase::Inhale)
    }
}

impl BreathingMachine {
    /// Creates an idle machine. Fails when any phase has zero length.
    pub fn new(durations: PhaseDurations, first_phase: Phase) -> Result<Self> {
        durations.validate()?;
        Ok(Self::with_table(durations, first_phase))
    }

    fn with_table(durations: PhaseDurations, first_phase: Phase) -> Self {
        Self {
            durations,
            first_phase,
            phase: first_phase,
            elapsed_us: 0,
            completed_cycles: 0,
            active: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_us)
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begins a fresh run. Has no effect while already running.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.phase = self.first_phase;
        self.elapsed_us = 0;
        self.active = true;
    }

    /// Stops ticking but keeps the current position.
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Flips between running and paused without touching the position.
    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.phase = self.first_phase;
        self.elapsed_us = 0;
        self.completed_cycles = 0;
    }

    /// Advances the session by `delta`.
    ///
    /// Performs at most one phase transition per call; time beyond the end of
    /// the current phase is discarded. Returns the phase entered, if any.
    pub fn tick(&mut self, delta: Duration) -> Option<Phase> {
        if !self.active {
            return None;
        }

        let delta_us = u64::try_from(delta.as_micros()).unwrap_or(u64::MAX);
        self.elapsed_us = self.elapsed_us.saturating_add(delta_us);

        if self.elapsed_us < self.phase_length_us() {
            return None;
        }

        self.phase = self.phase.next();
        self.elapsed_us = 0;
        if self.phase == self.first_phase {
            self.completed_cycles += 1;
        }
        Some(self.phase)
    }

    /// [`tick`](Self::tick) for schedulers that measure in fractional seconds.
    /// Negative or non-finite deltas count as zero.
    pub fn tick_seconds(&mut self, delta: f64) -> Option<Phase> {
        let delta = if delta.is_finite() && delta > 0.0 {
            Duration::try_from_secs_f64(delta).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        self.tick(delta)
    }

    fn phase_length_us(&self) -> u64 {
        u64::from(self.durations.seconds(self.phase)) * 1_000_000
    }

    pub fn snapshot(&self) -> BreathingSnapshot {
        let length_us = self.phase_length_us();
        let progress = if length_us == 0 {
            0.0
        } else {
            (self.elapsed_us as f64 / length_us as f64).clamp(0.0, 1.0 - f64::EPSILON)
        };
        let expansion = match self.phase {
            Phase::Inhale => progress,
            Phase::Hold => 1.0,
            Phase::Exhale => 1.0 - progress,
            Phase::Rest => 0.0,
        };
        let elapsed = self.elapsed_us as f64 / 1e6;
        let phase_duration = length_us as f64 / 1e6;

        BreathingSnapshot {
            phase: self.phase,
            instruction: self.phase.instruction().to_string(),
            elapsed,
            phase_duration,
            remaining: (phase_duration - elapsed).max(0.0),
            progress,
            expansion,
            completed_cycles: self.completed_cycles,
            active: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> BreathingMachine {
        let mut machine = BreathingMachine::default();
        machine.start();
        machine
    }

    #[test]
    fn test_full_cycle_at_100ms_cadence() {
        let mut machine = running();
        // 23 s of 100 ms ticks
        for _ in 0..230 {
            machine.tick(Duration::from_millis(100));
        }
        assert_eq!(machine.completed_cycles(), 1);
        assert_eq!(machine.phase(), Phase::Inhale);
        assert_eq!(machine.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_full_cycle_at_one_second_cadence() {
        let mut machine = running();
        for _ in 0..23 {
            machine.tick_seconds(1.0);
        }
        assert_eq!(machine.completed_cycles(), 1);
        assert_eq!(machine.phase(), Phase::Inhale);
    }

    #[test]
    fn test_phase_sized_ticks_complete_one_cycle() {
        let mut machine = running();
        for secs in [4, 7, 8, 4] {
            machine.tick(Duration::from_secs(secs));
        }
        assert_eq!(machine.completed_cycles(), 1);
        assert_eq!(machine.phase(), Phase::Inhale);
    }

    #[test]
    fn test_large_delta_moves_one_phase_only() {
        let mut machine = running();
        let entered = machine.tick(Duration::from_secs(600));
        assert_eq!(entered, Some(Phase::Hold));
        assert_eq!(machine.phase(), Phase::Hold);
        assert_eq!(machine.elapsed(), Duration::ZERO);
        assert_eq!(machine.completed_cycles(), 0);
    }

    #[test]
    fn test_negative_and_nan_deltas_are_ignored() {
        let mut machine = running();
        machine.tick_seconds(1.5);
        machine.tick_seconds(-3.0);
        machine.tick_seconds(f64::NAN);
        assert_eq!(machine.elapsed(), Duration::from_millis(1500));
        assert_eq!(machine.phase(), Phase::Inhale);
    }

    #[test]
    fn test_tick_is_noop_when_inactive() {
        let mut machine = BreathingMachine::default();
        assert_eq!(machine.tick(Duration::from_secs(10)), None);
        assert_eq!(machine.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_pause_preserves_position_and_toggle_resumes() {
        let mut machine = running();
        machine.tick(Duration::from_secs(4));
        machine.tick(Duration::from_secs(2));
        machine.pause();
        machine.tick(Duration::from_secs(3));
        assert_eq!(machine.phase(), Phase::Hold);
        assert_eq!(machine.elapsed(), Duration::from_secs(2));

        machine.toggle();
        assert!(machine.is_active());
        assert_eq!(machine.phase(), Phase::Hold);
        assert_eq!(machine.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_start_after_stop_resets_position_but_not_cycles() {
        let mut machine = running();
        for _ in 0..23 {
            machine.tick(Duration::from_secs(1));
        }
        machine.tick(Duration::from_secs(2));
        machine.pause();
        machine.start();
        assert_eq!(machine.phase(), Phase::Inhale);
        assert_eq!(machine.elapsed(), Duration::ZERO);
        assert_eq!(machine.completed_cycles(), 1);
    }

    #[test]
    fn test_start_while_active_keeps_position() {
        let mut machine = running();
        machine.tick(Duration::from_secs(2));
        machine.start();
        assert_eq!(machine.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut machine = running();
        for _ in 0..57 {
            machine.tick(Duration::from_secs(1));
        }
        machine.reset();
        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Inhale);
        assert_eq!(snap.elapsed, 0.0);
        assert_eq!(snap.completed_cycles, 0);
        assert!(!snap.active);
    }

    #[test]
    fn test_custom_first_phase_counts_cycles_on_reentry() {
        let durations = PhaseDurations {
            inhale: 4,
            hold: 7,
            exhale: 8,
            rest: 3,
        };
        let mut machine = BreathingMachine::new(durations, Phase::Exhale).unwrap();
        machine.start();
        assert_eq!(machine.phase(), Phase::Exhale);
        for secs in [8, 3, 4] {
            machine.tick(Duration::from_secs(secs));
        }
        assert_eq!(machine.completed_cycles(), 0);
        machine.tick(Duration::from_secs(7));
        assert_eq!(machine.phase(), Phase::Exhale);
        assert_eq!(machine.completed_cycles(), 1);
    }

    #[test]
    fn test_snapshot_progress_and_expansion() {
        let mut machine = running();
        machine.tick(Duration::from_secs(1));
        let snap = machine.snapshot();
        assert_eq!(snap.progress, 0.25);
        assert_eq!(snap.expansion, 0.25);
        assert_eq!(snap.remaining, 3.0);
        assert_eq!(snap.instruction, "Breathe in slowly...");

        machine.tick(Duration::from_secs(3));
        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Hold);
        assert_eq!(snap.progress, 0.0);
        assert_eq!(snap.expansion, 1.0);
    }

    #[test]
    fn test_zero_length_table_is_rejected() {
        let durations = PhaseDurations {
            hold: 0,
            ..PhaseDurations::default()
        };
        assert!(BreathingMachine::new(durations, Phase::Inhale).is_err());
    }
}
