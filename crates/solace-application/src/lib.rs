//! Application layer for Solace.
//!
//! Coordinates the domain logic in `solace-core` with the durable store from
//! `solace-infrastructure`: session state with write-through persistence, the
//! account directory, the mood journal, the conversation engine, the breathing
//! timer and the `WellnessEngine` facade over all of them.

pub mod account_directory;
pub mod breathing_session;
pub mod conversation;
pub mod engine;
pub mod mood_journal;
pub mod state_store;

pub use account_directory::AccountDirectory;
pub use breathing_session::BreathingSession;
pub use conversation::{ConversationEngine, PendingReply};
pub use engine::WellnessEngine;
pub use mood_journal::MoodJournal;
pub use state_store::{SessionState, Slice, StateStore};
