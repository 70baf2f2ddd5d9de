//! Data Transfer Objects (DTOs) for persistence.
//!
//! The persisted shape is camelCase JSON with ISO-8601 timestamps. DTOs are the
//! schema-validation boundary: a value that does not deserialise into its DTO
//! is treated as absent, logged, and never reaches the domain.

mod account;
mod chat_message;
mod mood_entry;

pub use account::AccountDto;
pub use chat_message::{ChatMessageDto, SenderDto};
pub use mood_entry::MoodEntryDto;

use serde::Serialize;
use serde::de::DeserializeOwned;
use solace_core::error::Result;

/// Parses the raw value stored under `key`.
///
/// Returns `None` when the key is absent or the value is malformed; the latter
/// is logged at `warn`.
pub fn decode<T: DeserializeOwned>(key: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding malformed persisted value");
            None
        }
    }
}

/// Serialises a DTO for storage.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
