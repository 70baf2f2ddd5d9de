//! Infrastructure layer for Solace.
//!
//! File-backed durable storage, platform paths, persisted DTOs and
//! configuration loading.

pub mod config_service;
pub mod dto;
pub mod file_store;
pub mod keys;
pub mod paths;

pub use config_service::ConfigService;
pub use file_store::FileStore;
pub use keys::StorageKeys;
pub use paths::{PathError, SolacePaths};
