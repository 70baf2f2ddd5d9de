//! Account domain module.
//!
//! - `model`: the registered account
//! - `password`: salted credential hashing

mod model;
mod password;

pub use model::Account;
pub use password::PasswordHash;
