//! Account DTO.

use serde::{Deserialize, Serialize};

use solace_core::account::{Account, PasswordHash};

/// Persisted account record.
///
/// `password` holds the encoded salted hash. Records written before hashing
/// hold the plaintext instead; the domain recognises and upgrades them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub streak_days: u32,
}

impl AccountDto {
    pub fn into_domain(self) -> Account {
        Account {
            name: self.name,
            password: PasswordHash::from_stored(self.password),
            streak_days: self.streak_days,
        }
    }
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        AccountDto {
            name: account.name.clone(),
            password: account.password.as_str().to_string(),
            streak_days: account.streak_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_field_names() {
        let account = Account::register("ann", "pw");
        let json = serde_json::to_value(AccountDto::from(&account)).unwrap();
        assert_eq!(json["name"], "ann");
        assert_eq!(json["streakDays"], 1);
        assert!(json["password"].as_str().unwrap().starts_with("sha256$"));
    }

    #[test]
    fn test_user_record_without_password() {
        // Earlier builds persisted the current user as `{name, streakDays}` only
        let dto: AccountDto = serde_json::from_str(r#"{"name":"ann","streakDays":3}"#).unwrap();
        let account = dto.into_domain();
        assert_eq!(account.name, "ann");
        assert_eq!(account.streak_days, 3);
        assert!(!account.password.verify(""));
    }

    #[test]
    fn test_plaintext_password_is_kept_for_upgrade() {
        let dto: AccountDto =
            serde_json::from_str(r#"{"name":"bo","password":"hunter2","streakDays":1}"#).unwrap();
        let account = dto.into_domain();
        assert!(account.password.needs_rehash());
        assert!(account.password.verify("hunter2"));
    }
}
