//! Engine configuration model.
//!
//! Every field has a default, so an empty or partial `config.toml` is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::breathing::{Phase, PhaseDurations};
use crate::error::{Result, SolaceError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
    pub storage: StorageSettings,
    pub startup: StartupSettings,
    pub conversation: ConversationSettings,
    pub breathing: BreathingSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            storage: StorageSettings::default(),
            startup: StartupSettings::default(),
            conversation: ConversationSettings::default(),
            breathing: BreathingSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.breathing.durations.validate()?;
        if self.breathing.tick_interval_ms == 0 {
            return Err(SolaceError::config("breathing.tick_interval_ms must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Prefix shared by every persisted key.
    pub key_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            key_prefix: "solace-".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupSettings {
    /// Upper bound on the loading barrier while state is rehydrated.
    pub loading_timeout_ms: u64,
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            loading_timeout_ms: 500,
        }
    }
}

impl StartupSettings {
    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    /// Simulated delay before the agent's reply is appended.
    pub reply_latency_ms: u64,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            reply_latency_ms: 1000,
        }
    }
}

impl ConversationSettings {
    pub fn reply_latency(&self) -> Duration {
        Duration::from_millis(self.reply_latency_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingSettings {
    /// Phase whose re-entry completes a cycle.
    pub first_phase: Phase,
    /// Scheduler cadence for the session ticker.
    pub tick_interval_ms: u64,
    pub durations: PhaseDurations,
}

impl Default for BreathingSettings {
    fn default() -> Self {
        Self {
            first_phase: Phase::Inhale,
            tick_interval_ms: 100,
            durations: PhaseDurations::default(),
        }
    }
}

impl BreathingSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
