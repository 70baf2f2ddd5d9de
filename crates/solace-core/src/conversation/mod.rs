//! Conversation domain module.
//!
//! - `message`: chat log entries
//! - `responder`: ordered keyword rules producing canned replies

mod message;
mod responder;

pub use message::{ChatMessage, Sender};
pub use responder::{Responder, Rule, WELCOME_MESSAGE};
