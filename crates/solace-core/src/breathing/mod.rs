//! Guided breathing domain module.

mod machine;
mod phase;

pub use machine::{BreathingMachine, BreathingSnapshot};
pub use phase::{Phase, PhaseDurations};
