//! Account domain model.

use serde::{Deserialize, Serialize};

use super::password::PasswordHash;

/// A registered account.
///
/// `name` is the unique, case-sensitive key of the account directory.
/// The credential is never kept in plain text once the account has been
/// registered or has logged in at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Display name and login key.
    pub name: String,
    /// Stored credential.
    pub password: PasswordHash,
    /// Consecutive days of use. Starts at 1 on registration.
    pub streak_days: u32,
}

impl Account {
    /// Creates a freshly registered account with a newly salted hash.
    pub fn register(name: impl Into<String>, password: &str) -> Self {
        Self {
            name: name.into(),
            password: PasswordHash::new(password),
            streak_days: 1,
        }
    }

    /// Returns the first letter of the name, upper-cased, for avatars.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().and_then(|c| c.to_uppercase().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_starts_streak_at_one() {
        let account = Account::register("ann", "pw1");
        assert_eq!(account.name, "ann");
        assert_eq!(account.streak_days, 1);
        assert!(account.password.verify("pw1"));
    }

    #[test]
    fn test_initial() {
        assert_eq!(Account::register("ann", "x").initial(), Some('A'));
        assert_eq!(Account::register("", "x").initial(), None);
    }
}
