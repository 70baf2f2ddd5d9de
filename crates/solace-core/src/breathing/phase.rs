//! Breathing phases and their timing table.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{Result, SolaceError};

/// One of the four breathing states, visited in a fixed cyclic order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    Rest,
}

impl Phase {
    /// The phase that follows this one.
    pub fn next(self) -> Self {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Rest,
            Phase::Rest => Phase::Inhale,
        }
    }

    /// Guidance text shown while the phase is running.
    pub fn instruction(self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe in slowly...",
            Phase::Hold => "Hold your breath...",
            Phase::Exhale => "Exhale slowly...",
            Phase::Rest => "Rest...",
        }
    }
}

/// Phase durations in whole seconds.
///
/// Defaults to the 4-7-8 relaxation pattern with a 4 second rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub inhale: u32,
    pub hold: u32,
    pub exhale: u32,
    pub rest: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            inhale: 4,
            hold: 7,
            exhale: 8,
            rest: 4,
        }
    }
}

impl PhaseDurations {
    pub fn seconds(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::Hold => self.hold,
            Phase::Exhale => self.exhale,
            Phase::Rest => self.rest,
        }
    }

    pub fn duration(&self, phase: Phase) -> Duration {
        Duration::from_secs(u64::from(self.seconds(phase)))
    }

    /// Every phase must last at least one second.
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("inhale", self.inhale),
            ("hold", self.hold),
            ("exhale", self.exhale),
            ("rest", self.rest),
        ] {
            if secs == 0 {
                return Err(SolaceError::config(format!(
                    "breathing phase '{name}' must last at least one second"
                )));
            }
        }
        Ok(())
    }
}
