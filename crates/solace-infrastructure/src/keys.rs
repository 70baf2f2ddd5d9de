//! Names of the persisted keys.

/// The full key names for every persisted slice, built from one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub user: String,
    pub users: String,
    pub mood_history: String,
    pub chat_messages: String,
    pub dark_mode: String,
}

impl StorageKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            user: format!("{prefix}user"),
            users: format!("{prefix}users"),
            mood_history: format!("{prefix}mood-history"),
            chat_messages: format!("{prefix}chat-messages"),
            dark_mode: format!("{prefix}dark-mode"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("solace-")
    }
}
