//! Timer driver for the breathing machine.
//!
//! While the session is active a tokio interval feeds fixed `tick_interval`
//! steps into the machine held by the state store. Pausing, resetting or
//! dropping the session cancels the ticker.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use solace_core::breathing::{BreathingSnapshot, Phase};

use crate::state_store::StateStore;

#[derive(Debug)]
pub struct BreathingSession {
    store: StateStore,
    tick_interval: Duration,
    ticker: Mutex<Option<CancellationToken>>,
}

impl BreathingSession {
    pub fn new(store: StateStore, tick_interval: Duration) -> Self {
        Self {
            store,
            tick_interval,
            ticker: Mutex::new(None),
        }
    }

    /// Starts the session from the first phase. No-op when already active.
    pub fn start(&self) {
        let started = self.store.mutate_transient(|state| {
            let was_active = state.breathing.is_active();
            state.breathing.start();
            !was_active
        });
        if started {
            tracing::debug!("Breathing session started");
            self.spawn_ticker();
        }
    }

    /// Stops ticking without losing the position in the cycle.
    pub fn pause(&self) {
        self.store.mutate_transient(|state| state.breathing.pause());
        self.cancel_ticker();
        tracing::debug!("Breathing session paused");
    }

    /// Flips between running and paused without resetting.
    pub fn toggle(&self) {
        let active = self.store.mutate_transient(|state| {
            state.breathing.toggle();
            state.breathing.is_active()
        });
        if active {
            self.spawn_ticker();
        } else {
            self.cancel_ticker();
        }
    }

    pub fn reset(&self) {
        self.store.mutate_transient(|state| state.breathing.reset());
        self.cancel_ticker();
        tracing::debug!("Breathing session reset");
    }

    /// Advances the machine by `delta` directly, bypassing the ticker.
    pub fn advance(&self, delta: Duration) -> Option<Phase> {
        self.store.mutate_transient(|state| state.breathing.tick(delta))
    }

    pub fn snapshot(&self) -> BreathingSnapshot {
        self.store.read(|state| state.breathing.snapshot())
    }

    fn spawn_ticker(&self) {
        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|token| !token.is_cancelled()) {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; breathing session must be advanced manually");
            return;
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let store = self.store.clone();
        let step = self.tick_interval;

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(step);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        let (entered, cycles) = store.mutate_transient(|state| {
                            let entered = state.breathing.tick(step);
                            (entered, state.breathing.completed_cycles())
                        });
                        if let Some(phase) = entered {
                            tracing::trace!(%phase, cycles, "Breathing phase changed");
                        }
                    }
                }
            }
        });

        *slot = Some(token);
    }

    fn cancel_ticker(&self) {
        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = slot.take() {
            token.cancel();
        }
    }
}

impl Drop for BreathingSession {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_core::breathing::BreathingMachine;
    use solace_core::store::MemoryStore;
    use solace_infrastructure::StorageKeys;
    use std::sync::Arc;

    fn session() -> BreathingSession {
        let store = StateStore::open(
            Arc::new(MemoryStore::new()),
            StorageKeys::default(),
            BreathingMachine::default(),
        );
        BreathingSession::new(store, Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle_returns_to_inhale() {
        let session = session();
        session.start();

        tokio::time::sleep(Duration::from_millis(23_050)).await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.completed_cycles, 1);
        assert_eq!(snapshot.phase, Phase::Inhale);
        assert!(snapshot.active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_ticking() {
        let session = session();
        session.start();
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        session.pause();

        let paused = session.snapshot();
        assert!(!paused.active);
        assert!((paused.elapsed - 1.0).abs() < 1e-9);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.snapshot(), paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_resumes_where_it_stopped() {
        let session = session();
        session.start();
        tokio::time::sleep(Duration::from_millis(4_550)).await;
        session.toggle();
        assert_eq!(session.snapshot().phase, Phase::Hold);

        session.toggle();
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        let snapshot = session.snapshot();
        assert!(snapshot.active);
        assert_eq!(snapshot.phase, Phase::Hold);
        assert!((snapshot.elapsed - 1.5).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_returns_to_initial_state() {
        let session = session();
        session.start();
        tokio::time::sleep(Duration::from_secs(30)).await;
        session.reset();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Inhale);
        assert_eq!(snapshot.elapsed, 0.0);
        assert_eq!(snapshot.completed_cycles, 0);
        assert!(!snapshot.active);
    }

    #[test]
    fn test_start_outside_runtime_still_activates() {
        let session = session();
        session.start();
        assert!(session.snapshot().active);
        session.advance(Duration::from_secs(4));
        assert_eq!(session.snapshot().phase, Phase::Hold);
    }
}
