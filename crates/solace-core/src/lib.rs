//! Domain layer for Solace.
//!
//! Pure domain models and logic: accounts, the mood journal aggregation,
//! the breathing state machine, the reply rules, configuration, and the
//! durable key/value store abstraction the other layers build on.

pub mod account;
pub mod breathing;
pub mod config;
pub mod conversation;
pub mod error;
pub mod mood;
pub mod store;

// Re-export common error type
pub use error::{Result, SolaceError};
pub use store::{DurableStore, MemoryStore};
