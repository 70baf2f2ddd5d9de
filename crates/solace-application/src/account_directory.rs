//! Account registration, login and profile changes.

use solace_core::account::{Account, PasswordHash};
use solace_core::error::{Result, SolaceError};

use crate::state_store::{Slice, StateStore};

/// Directory of known accounts plus the logged-in user.
///
/// Names are unique and compared exactly and case-sensitively; a name with
/// surrounding whitespace is rejected. Passwords are only ever stored as
/// salted hashes.
#[derive(Debug, Clone)]
pub struct AccountDirectory {
    store: StateStore,
}

impl AccountDirectory {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Registers a new account and logs it in.
    pub fn register(&self, name: &str, password: &str) -> Result<Account> {
        let name = required_name(name)?;
        required_password(password)?;

        let account = self.store.mutate(&[Slice::Accounts, Slice::CurrentUser], |state| {
            if state.accounts.iter().any(|a| a.name == name) {
                return Err(SolaceError::conflict("Username already exists"));
            }
            let account = Account::register(name, password);
            state.accounts.push(account.clone());
            state.current_user = Some(account.clone());
            Ok(account)
        })?;

        tracing::info!(user = %account.name, "Account registered");
        Ok(account)
    }

    /// Logs in with `name` and `password`.
    ///
    /// Every mismatch yields the same [`SolaceError::Auth`]. A legacy
    /// plaintext credential is upgraded to a salted hash on success.
    pub fn login(&self, name: &str, password: &str) -> Result<Account> {
        let name = required_name(name)?;
        required_password(password)?;

        let outcome = self.store.mutate(&[Slice::Accounts, Slice::CurrentUser], |state| {
            let Some(account) = state
                .accounts
                .iter_mut()
                .find(|a| a.name == name && a.password.verify(password))
            else {
                return Err(SolaceError::Auth);
            };

            let upgraded = account.password.needs_rehash();
            if upgraded {
                account.password = PasswordHash::new(password);
            }
            let account = account.clone();
            state.current_user = Some(account.clone());
            Ok((account, upgraded))
        });

        match outcome {
            Ok((account, upgraded)) => {
                if upgraded {
                    tracing::info!(user = %account.name, "Upgraded legacy credential");
                }
                tracing::info!(user = %account.name, "Logged in");
                Ok(account)
            }
            Err(e) => {
                if e.is_auth() {
                    tracing::info!("Login rejected");
                }
                Err(e)
            }
        }
    }

    /// Clears the current user. The directory is untouched.
    pub fn logout(&self) -> Result<()> {
        let previous = self.store.mutate(&[Slice::CurrentUser], |state| {
            Ok(state.current_user.take())
        })?;
        if let Some(account) = previous {
            tracing::info!(user = %account.name, "Logged out");
        }
        Ok(())
    }

    /// Renames the logged-in account.
    pub fn update_profile(&self, new_name: &str) -> Result<Account> {
        let new_name = required_name(new_name)?;

        let account = self.store.mutate(&[Slice::Accounts, Slice::CurrentUser], |state| {
            let Some(current) = state.current_user.as_mut() else {
                return Err(SolaceError::Auth);
            };
            if new_name != current.name && state.accounts.iter().any(|a| a.name == new_name) {
                return Err(SolaceError::conflict("Username already exists"));
            }

            if let Some(entry) = state.accounts.iter_mut().find(|a| a.name == current.name) {
                entry.name = new_name.to_string();
            }
            current.name = new_name.to_string();
            Ok(current.clone())
        })?;

        tracing::info!(user = %account.name, "Profile updated");
        Ok(account)
    }

    pub fn current_user(&self) -> Option<Account> {
        self.store.read(|state| state.current_user.clone())
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.store.read(|state| state.accounts.clone())
    }
}

fn required_name(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(SolaceError::validation("Please enter a username"));
    }
    if name.trim() != name {
        return Err(SolaceError::validation(
            "Username cannot start or end with spaces",
        ));
    }
    Ok(name)
}

fn required_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(SolaceError::validation("Please enter a password"));
    }
    Ok(())
}
