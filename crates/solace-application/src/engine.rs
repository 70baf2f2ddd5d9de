//! The presentation-facing facade.
//!
//! `WellnessEngine` wires the state store and the four components together and
//! exposes the intents a front-end dispatches plus the state it renders.

use std::sync::Arc;

use solace_core::account::Account;
use solace_core::breathing::BreathingMachine;
use solace_core::config::EngineConfig;
use solace_core::conversation::{ChatMessage, Responder};
use solace_core::error::Result;
use solace_core::mood::{Mood, MoodEntry, TrendPoint};
use solace_core::store::DurableStore;
use solace_infrastructure::StorageKeys;

use crate::account_directory::AccountDirectory;
use crate::breathing_session::BreathingSession;
use crate::conversation::{ConversationEngine, PendingReply};
use crate::mood_journal::MoodJournal;
use crate::state_store::{SessionState, StateStore};

pub struct WellnessEngine {
    config: EngineConfig,
    store: StateStore,
    accounts: AccountDirectory,
    journal: MoodJournal,
    conversation: ConversationEngine,
    breathing: BreathingSession,
}

impl WellnessEngine {
    /// Assembles the engine and starts loading persisted state.
    ///
    /// Loading runs on a blocking thread. `open` waits for it at most
    /// `startup.loading_timeout_ms`; past that the engine is returned with
    /// [`WellnessEngine::is_loading`] still true and the load finishes in the
    /// background. Changes made in the meantime are kept in memory and merged
    /// into the loaded state once it arrives.
    pub async fn open(config: EngineConfig, durable: Arc<dyn DurableStore>) -> Result<Self> {
        config.validate()?;
        let machine = BreathingMachine::new(
            config.breathing.durations,
            config.breathing.first_phase,
        )?;
        let responder = Responder::builtin()?;
        let keys = StorageKeys::new(&config.storage.key_prefix);

        let store = StateStore::loading(durable.clone(), keys, machine.clone());
        let conversation = ConversationEngine::new(
            store.clone(),
            responder,
            config.conversation.reply_latency(),
        );

        let mut loader = tokio::spawn(Self::load(
            store.clone(),
            conversation.clone(),
            durable,
            machine,
        ));
        match tokio::time::timeout(config.startup.loading_timeout(), &mut loader).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Loader task failed"),
            Err(_) => tracing::warn!(
                timeout_ms = config.startup.loading_timeout_ms,
                "Rehydration is slow, continuing to load in the background"
            ),
        }

        let engine = Self {
            accounts: AccountDirectory::new(store.clone()),
            journal: MoodJournal::new(store.clone()),
            breathing: BreathingSession::new(store.clone(), config.breathing.tick_interval()),
            conversation,
            store,
            config,
        };
        tracing::info!(
            user = ?engine.current_user().map(|a| a.name),
            loading = engine.is_loading(),
            "Engine ready"
        );
        Ok(engine)
    }

    /// Reads the durable store and installs the result, then seeds the
    /// welcome message.
    async fn load(
        store: StateStore,
        conversation: ConversationEngine,
        durable: Arc<dyn DurableStore>,
        machine: BreathingMachine,
    ) {
        let keys = store.keys().clone();
        let fallback = SessionState {
            breathing: machine.clone(),
            ..SessionState::default()
        };

        let rehydrated = match tokio::task::spawn_blocking(move || {
            SessionState::rehydrate(durable.as_ref(), &keys, machine)
        })
        .await
        {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Rehydration failed, starting empty");
                fallback
            }
        };

        if let Err(e) = store.install(rehydrated) {
            tracing::warn!(error = %e, "Changes made while loading could not be persisted");
        }
        if let Err(e) = conversation.ensure_welcome() {
            tracing::warn!(error = %e, "Welcome message could not be persisted");
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// True until persisted state has been loaded.
    ///
    /// Front-ends use this as a startup barrier. Intents issued while it is
    /// up are accepted and saved once loading completes.
    pub fn is_loading(&self) -> bool {
        !self.store.is_loaded()
    }

    // ============================================================================
    // Accounts
    // ============================================================================

    pub fn register(&self, name: &str, password: &str) -> Result<Account> {
        self.accounts.register(name, password)
    }

    pub fn login(&self, name: &str, password: &str) -> Result<Account> {
        self.accounts.login(name, password)
    }

    pub fn logout(&self) -> Result<()> {
        self.accounts.logout()
    }

    pub fn update_profile(&self, new_name: &str) -> Result<Account> {
        self.accounts.update_profile(new_name)
    }

    pub fn current_user(&self) -> Option<Account> {
        self.accounts.current_user()
    }

    pub fn accounts(&self) -> &AccountDirectory {
        &self.accounts
    }

    // ============================================================================
    // Mood journal
    // ============================================================================

    pub fn select_mood(&self, mood: Mood) {
        self.journal.select(mood);
    }

    pub fn current_mood(&self) -> Option<Mood> {
        self.journal.current_mood()
    }

    pub fn record_mood(&self, mood: Option<Mood>, notes: Option<&str>) -> Result<MoodEntry> {
        self.journal.record(mood, notes)
    }

    /// Trend over the last `days` days, bucketed in the local time zone.
    pub fn mood_trend(&self, days: u32) -> Vec<TrendPoint> {
        self.journal.trend(days)
    }

    pub fn dominant_mood(&self) -> Option<Mood> {
        self.journal.dominant_mood()
    }

    pub fn mood_history(&self) -> Vec<MoodEntry> {
        self.journal.history()
    }

    pub fn journal(&self) -> &MoodJournal {
        &self.journal
    }

    // ============================================================================
    // Conversation
    // ============================================================================

    pub fn send_chat_message(&self, text: &str) -> Result<PendingReply> {
        self.conversation.send_message(text)
    }

    pub fn chat_log(&self) -> Vec<ChatMessage> {
        self.conversation.chat_log()
    }

    pub fn is_responding(&self) -> bool {
        self.conversation.is_responding()
    }

    pub fn conversation(&self) -> &ConversationEngine {
        &self.conversation
    }

    // ============================================================================
    // Breathing and preferences
    // ============================================================================

    pub fn breathing(&self) -> &BreathingSession {
        &self.breathing
    }

    pub fn dark_mode(&self) -> bool {
        self.store.dark_mode()
    }

    pub fn toggle_dark_mode(&self) -> Result<bool> {
        self.store.toggle_dark_mode()
    }
}

impl std::fmt::Debug for WellnessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WellnessEngine")
            .field("store", &self.store)
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
