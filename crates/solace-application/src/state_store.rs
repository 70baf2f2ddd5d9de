//! Session state with write-through persistence.
//!
//! `StateStore` owns every slice of session state behind one mutex. Components
//! mutate it through [`StateStore::mutate`], naming the slices they touch; those
//! slices are written to the durable store before the call returns. The
//! breathing slice and the current mood live in memory only.
//!
//! A store created with [`StateStore::loading`] has not seen the persisted
//! state yet. Until [`StateStore::install`] hands it over, mutations stay in
//! memory so a half-started session cannot overwrite saved slices.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use solace_core::account::Account;
use solace_core::breathing::BreathingMachine;
use solace_core::conversation::ChatMessage;
use solace_core::error::{Result, SolaceError};
use solace_core::mood::{Mood, MoodEntry};
use solace_core::store::DurableStore;
use solace_infrastructure::StorageKeys;
use solace_infrastructure::dto::{self, AccountDto, ChatMessageDto, MoodEntryDto};

/// A persisted slice of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    CurrentUser,
    Accounts,
    MoodHistory,
    ChatLog,
    DarkMode,
}

/// Everything the engine knows about the running session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub current_user: Option<Account>,
    pub accounts: Vec<Account>,
    pub mood_history: Vec<MoodEntry>,
    pub current_mood: Option<Mood>,
    pub chat_log: Vec<ChatMessage>,
    pub breathing: BreathingMachine,
    pub dark_mode: bool,
}

impl SessionState {
    /// Rebuilds state from `durable`. Absent or malformed keys leave their
    /// slice at its default.
    pub fn rehydrate(durable: &dyn DurableStore, keys: &StorageKeys, breathing: BreathingMachine) -> Self {
        let current_user = dto::decode::<AccountDto>(&keys.user, durable.read(&keys.user).as_deref())
            .map(AccountDto::into_domain);

        let accounts = dto::decode::<Vec<AccountDto>>(&keys.users, durable.read(&keys.users).as_deref())
            .map(|records| records.into_iter().map(AccountDto::into_domain).collect())
            .unwrap_or_default();

        let mood_history = dto::decode::<Vec<MoodEntryDto>>(
            &keys.mood_history,
            durable.read(&keys.mood_history).as_deref(),
        )
        .map(|records| records.into_iter().map(MoodEntryDto::into_domain).collect())
        .unwrap_or_default();

        let chat_log = dto::decode::<Vec<ChatMessageDto>>(
            &keys.chat_messages,
            durable.read(&keys.chat_messages).as_deref(),
        )
        .map(|records| records.into_iter().map(ChatMessageDto::into_domain).collect())
        .unwrap_or_default();

        let dark_mode = dto::decode::<bool>(&keys.dark_mode, durable.read(&keys.dark_mode).as_deref())
            .unwrap_or(false);

        let state = Self {
            current_user,
            accounts,
            mood_history,
            current_mood: None,
            chat_log,
            breathing,
            dark_mode,
        };
        tracing::debug!(
            user = state.current_user.as_ref().map(|a| a.name.as_str()),
            accounts = state.accounts.len(),
            moods = state.mood_history.len(),
            messages = state.chat_log.len(),
            dark_mode = state.dark_mode,
            "Rehydrated session state"
        );
        state
    }

    /// Folds changes made before rehydration finished into `self`, the
    /// rehydrated state. Only the `touched` slices take anything from
    /// `session`; appended records go after the persisted ones.
    fn absorb(&mut self, session: SessionState, touched: &[Slice]) {
        self.breathing = session.breathing;
        self.current_mood = session.current_mood;

        for slice in touched {
            match slice {
                Slice::CurrentUser => self.current_user = session.current_user.clone(),
                Slice::Accounts => {
                    for account in &session.accounts {
                        if self.accounts.iter().any(|a| a.name == account.name) {
                            tracing::warn!(user = %account.name, "Dropping account that already exists on disk");
                        } else {
                            self.accounts.push(account.clone());
                        }
                    }
                }
                Slice::MoodHistory => self.mood_history.extend(session.mood_history.iter().cloned()),
                Slice::ChatLog => self.chat_log.extend(session.chat_log.iter().cloned()),
                Slice::DarkMode => self.dark_mode = session.dark_mode,
            }
        }
    }
}

struct Shared {
    state: SessionState,
    /// Slices changed while still loading; `None` once loaded.
    deferred: Option<Vec<Slice>>,
}

/// Shared handle to the session state. Cloning is cheap and every clone sees
/// the same state.
#[derive(Clone)]
pub struct StateStore {
    shared: Arc<Mutex<Shared>>,
    durable: Arc<dyn DurableStore>,
    keys: StorageKeys,
}

impl StateStore {
    /// Wraps already-built state.
    pub fn new(durable: Arc<dyn DurableStore>, keys: StorageKeys, state: SessionState) -> Self {
        Self::with_shared(durable, keys, state, None)
    }

    /// Creates a store whose persisted state is still on its way.
    ///
    /// Mutations are applied in memory and written through only after
    /// [`StateStore::install`].
    pub fn loading(durable: Arc<dyn DurableStore>, keys: StorageKeys, breathing: BreathingMachine) -> Self {
        let state = SessionState {
            breathing,
            ..SessionState::default()
        };
        Self::with_shared(durable, keys, state, Some(Vec::new()))
    }

    fn with_shared(
        durable: Arc<dyn DurableStore>,
        keys: StorageKeys,
        state: SessionState,
        deferred: Option<Vec<Slice>>,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared { state, deferred })),
            durable,
            keys,
        }
    }

    /// Rehydrates from `durable` and wraps the result.
    pub fn open(durable: Arc<dyn DurableStore>, keys: StorageKeys, breathing: BreathingMachine) -> Self {
        let state = SessionState::rehydrate(durable.as_ref(), &keys, breathing);
        Self::new(durable, keys, state)
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.lock().state)
    }

    /// False until the persisted state has been installed.
    pub fn is_loaded(&self) -> bool {
        self.lock().deferred.is_none()
    }

    /// Replaces the placeholder state with `rehydrated`, keeping whatever
    /// the session changed in the meantime, and writes those slices through.
    ///
    /// Has no effect on a store that is already loaded.
    pub fn install(&self, rehydrated: SessionState) -> Result<()> {
        let mut shared = self.lock();
        let Some(touched) = shared.deferred.take() else {
            return Ok(());
        };

        let session = std::mem::replace(&mut shared.state, rehydrated);
        shared.state.absorb(session, &touched);
        tracing::debug!(?touched, "Installed rehydrated state");
        self.persist_all(&shared.state, &touched)
    }

    /// Runs `f` against mutable state, then writes `slices` through.
    ///
    /// When `f` fails nothing is written, so `f` must not mutate before it
    /// has validated its input. When a write fails the in-memory change is
    /// kept and the first persistence error is returned. While loading, the
    /// slices are only remembered and written by [`StateStore::install`].
    pub fn mutate<R>(
        &self,
        slices: &[Slice],
        f: impl FnOnce(&mut SessionState) -> Result<R>,
    ) -> Result<R> {
        let mut shared = self.lock();
        let output = f(&mut shared.state)?;

        if let Some(deferred) = shared.deferred.as_mut() {
            for slice in slices {
                if !deferred.contains(slice) {
                    deferred.push(*slice);
                }
            }
            return Ok(output);
        }
        self.persist_all(&shared.state, slices)?;
        Ok(output)
    }

    /// Mutates in-memory-only state (breathing, current mood).
    pub fn mutate_transient<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.lock().state)
    }

    /// Writes every slice, returning the first failure.
    fn persist_all(&self, state: &SessionState, slices: &[Slice]) -> Result<()> {
        let mut first_error = None;
        for slice in slices {
            if let Err(e) = self.persist(state, *slice) {
                tracing::warn!(?slice, error = %e, "Write-through failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn persist(&self, state: &SessionState, slice: Slice) -> Result<()> {
        match slice {
            Slice::CurrentUser => match &state.current_user {
                Some(account) => self.write(&self.keys.user, &AccountDto::from(account)),
                None => self.durable.erase(&self.keys.user),
            },
            Slice::Accounts => {
                let records: Vec<AccountDto> = state.accounts.iter().map(AccountDto::from).collect();
                self.write(&self.keys.users, &records)
            }
            Slice::MoodHistory => {
                let records: Vec<MoodEntryDto> =
                    state.mood_history.iter().map(MoodEntryDto::from).collect();
                self.write(&self.keys.mood_history, &records)
            }
            Slice::ChatLog => {
                let records: Vec<ChatMessageDto> =
                    state.chat_log.iter().map(ChatMessageDto::from).collect();
                self.write(&self.keys.chat_messages, &records)
            }
            Slice::DarkMode => self.write(&self.keys.dark_mode, &state.dark_mode),
        }
    }

    fn write<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = dto::encode(value).map_err(|e| SolaceError::persistence(key, e.to_string()))?;
        self.durable.write(key, &encoded)
    }

    // ============================================================================
    // Preferences
    // ============================================================================

    pub fn dark_mode(&self) -> bool {
        self.read(|state| state.dark_mode)
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.mutate(&[Slice::DarkMode], |state| {
            state.dark_mode = enabled;
            Ok(())
        })
    }

    /// Flips dark mode and returns the new value.
    pub fn toggle_dark_mode(&self) -> Result<bool> {
        self.mutate(&[Slice::DarkMode], |state| {
            state.dark_mode = !state.dark_mode;
            Ok(state.dark_mode)
        })
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("keys", &self.keys)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use solace_core::store::MemoryStore;

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_empty_store_rehydrates_to_defaults() {
        let store = StateStore::open(memory(), StorageKeys::default(), BreathingMachine::default());
        store.read(|state| {
            assert!(state.current_user.is_none());
            assert!(state.accounts.is_empty());
            assert!(state.mood_history.is_empty());
            assert!(state.chat_log.is_empty());
            assert!(!state.dark_mode);
        });
    }

    #[test]
    fn test_malformed_slice_defaults_others_survive() {
        let durable = Arc::new(MemoryStore::with_entries([
            ("solace-mood-history".to_string(), "{not json".to_string()),
            ("solace-dark-mode".to_string(), "true".to_string()),
        ]));
        let store = StateStore::open(durable, StorageKeys::default(), BreathingMachine::default());
        assert!(store.read(|state| state.mood_history.is_empty()));
        assert!(store.dark_mode());
    }

    #[test]
    fn test_dark_mode_is_written_through() {
        let durable = memory();
        let store = StateStore::open(durable.clone(), StorageKeys::default(), BreathingMachine::default());

        assert!(store.toggle_dark_mode().unwrap());
        assert_eq!(durable.read("solace-dark-mode").as_deref(), Some("true"));
        store.set_dark_mode(false).unwrap();
        assert_eq!(durable.read("solace-dark-mode").as_deref(), Some("false"));
    }

    #[test]
    fn test_failed_mutation_writes_nothing() {
        let durable = memory();
        let store = StateStore::open(durable.clone(), StorageKeys::default(), BreathingMachine::default());

        let result: Result<()> = store.mutate(&[Slice::DarkMode], |_| Err(SolaceError::validation("no")));
        assert!(result.is_err());
        assert!(durable.read("solace-dark-mode").is_none());
    }

    #[test]
    fn test_clearing_current_user_erases_key() {
        let durable = memory();
        let store = StateStore::open(durable.clone(), StorageKeys::default(), BreathingMachine::default());

        store
            .mutate(&[Slice::CurrentUser], |state| {
                state.current_user = Some(Account::register("ann", "pw"));
                Ok(())
            })
            .unwrap();
        assert!(durable.read("solace-user").is_some());

        store
            .mutate(&[Slice::CurrentUser], |state| {
                state.current_user = None;
                Ok(())
            })
            .unwrap();
        assert!(durable.read("solace-user").is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = StateStore::open(memory(), StorageKeys::default(), BreathingMachine::default());
        let other = store.clone();
        store.set_dark_mode(true).unwrap();
        assert!(other.dark_mode());
    }

    /// Accepts reads but fails every write.
    struct ReadOnlyStore;

    impl DurableStore for ReadOnlyStore {
        fn read(&self, _key: &str) -> Option<String> {
            None
        }

        fn write(&self, key: &str, _value: &str) -> Result<()> {
            Err(SolaceError::persistence(key, "read-only medium"))
        }

        fn erase(&self, key: &str) -> Result<()> {
            Err(SolaceError::persistence(key, "read-only medium"))
        }
    }

    #[test]
    fn test_failed_write_keeps_in_memory_change() {
        let store = StateStore::open(
            Arc::new(ReadOnlyStore),
            StorageKeys::default(),
            BreathingMachine::default(),
        );

        let err = store
            .mutate(&[Slice::MoodHistory, Slice::DarkMode], |state| {
                state.mood_history.push(MoodEntry::new(Utc::now(), Mood::Good, None));
                state.dark_mode = true;
                Ok(())
            })
            .unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(store.read(|state| state.mood_history.len()), 1);
        assert!(store.dark_mode());
    }

    #[test]
    fn test_loading_store_defers_writes() {
        let durable = Arc::new(MemoryStore::with_entries([
            ("solace-dark-mode", "true"),
            (
                "solace-mood-history",
                r#"[{"date":"2024-10-14T20:00:00.000Z","mood":"bad"}]"#,
            ),
        ]));
        let store = StateStore::loading(durable.clone(), StorageKeys::default(), BreathingMachine::default());
        assert!(!store.is_loaded());

        store
            .mutate(&[Slice::MoodHistory], |state| {
                state.mood_history.push(MoodEntry::new(Utc::now(), Mood::Great, None));
                Ok(())
            })
            .unwrap();
        assert!(durable.read("solace-mood-history").unwrap().contains("bad"));
        assert!(!durable.read("solace-mood-history").unwrap().contains("great"));

        let rehydrated = SessionState::rehydrate(durable.as_ref(), store.keys(), BreathingMachine::default());
        store.install(rehydrated).unwrap();
        assert!(store.is_loaded());

        let moods: Vec<_> = store.read(|state| state.mood_history.iter().map(|e| e.mood).collect());
        assert_eq!(moods, vec![Some(Mood::Bad), Some(Mood::Great)]);
        assert!(store.dark_mode(), "Untouched slices come from disk");

        let raw = durable.read("solace-mood-history").unwrap();
        assert!(raw.contains("bad") && raw.contains("great"));
        assert_eq!(durable.read("solace-dark-mode").as_deref(), Some("true"));
    }

    #[test]
    fn test_install_keeps_session_choices() {
        let durable = Arc::new(MemoryStore::with_entries([(
            "solace-users",
            r#"[{"name":"ann","password":"pw","streakDays":3}]"#,
        )]));
        let store = StateStore::loading(durable.clone(), StorageKeys::default(), BreathingMachine::default());

        store.set_dark_mode(true).unwrap();
        store
            .mutate(&[Slice::Accounts, Slice::CurrentUser], |state| {
                let account = Account::register("bo", "pw");
                state.accounts.push(account.clone());
                state.current_user = Some(account);
                Ok(())
            })
            .unwrap();
        assert!(durable.read("solace-dark-mode").is_none());

        let rehydrated = SessionState::rehydrate(durable.as_ref(), store.keys(), BreathingMachine::default());
        store.install(rehydrated).unwrap();

        let names: Vec<String> = store.read(|state| state.accounts.iter().map(|a| a.name.clone()).collect());
        assert_eq!(names, vec!["ann".to_string(), "bo".to_string()]);
        assert_eq!(store.read(|state| state.current_user.clone()).unwrap().name, "bo");
        assert_eq!(durable.read("solace-dark-mode").as_deref(), Some("true"));
        assert!(durable.read("solace-user").unwrap().contains("bo"));

        // A second install is ignored
        store.install(SessionState::default()).unwrap();
        assert_eq!(store.read(|state| state.accounts.len()), 2);
    }

    #[test]
    fn test_custom_prefix() {
        let durable = memory();
        let store = StateStore::open(durable.clone(), StorageKeys::new("t-"), BreathingMachine::default());
        store.set_dark_mode(true).unwrap();
        assert!(durable.read("t-dark-mode").is_some());
        assert!(durable.read("solace-dark-mode").is_none());
    }
}
