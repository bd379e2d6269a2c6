//! Session engine: owns one player's state and drives it.
//!
//! The engine is created at login and dropped at logout. It talks to
//! persistence only through [`ProgressStore`], which the gateway implements.

use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::config::GameConfig;
use crate::error::{EconomyError, StoreError};

use super::catalog::Catalog;
use super::clock::{on_tick, SimulationClock};
use super::economy::{self, PurchaseReceipt};
use super::save::{self, Snapshot};
use super::state::PlayerState;

/// Where the engine loads and persists progress.
pub trait ProgressStore {
    /// Raw snapshot JSON for `username`.
    fn fetch_progress(&mut self, username: &str) -> Result<String, StoreError>;
    fn persist_progress(&mut self, username: &str, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// What happened during one [`Engine::pump`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub ticks: u32,
    /// `Some(true)` when an autosave ran and succeeded, `Some(false)` when it failed.
    pub autosaved: Option<bool>,
}

/// Result of a successful [`Engine::purchase`].
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseOutcome {
    pub receipt: PurchaseReceipt,
    /// `None` when no save was attempted, otherwise whether it succeeded.
    pub saved: Option<bool>,
}

pub struct Engine {
    catalog: Rc<Catalog>,
    username: String,
    state: PlayerState,
    clock: SimulationClock,
    save_after_purchase: bool,
    last_saved: Option<DateTime<Utc>>,
}

impl Engine {
    /// A stopped engine with fresh progress for `username`.
    pub fn new(catalog: Rc<Catalog>, config: &GameConfig, username: impl Into<String>) -> Self {
        let state = PlayerState::new(&catalog);
        Self {
            clock: SimulationClock::new(
                config.ticks_per_second,
                config.autosave_interval_ms,
                config.max_frame_delta_ms,
            ),
            catalog,
            username: username.into(),
            state,
            save_after_purchase: config.save_after_purchase,
            last_saved: None,
        }
    }

    /// Replace the in-memory state with the stored snapshot, reconciled
    /// against the catalog. On failure the engine keeps fresh progress and
    /// the error is returned for display.
    pub fn load(&mut self, store: &mut impl ProgressStore) -> Result<(), StoreError> {
        match store.fetch_progress(&self.username) {
            Ok(raw) => {
                self.state = save::reconcile(Some(&raw), &self.catalog);
                log::info!(
                    "loaded progress for {}: balance={:.1} rate={:.1}/s",
                    self.username,
                    self.state.balance,
                    self.state.production_rate()
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("could not load progress for {}: {e}", self.username);
                self.state = save::reconcile(None, &self.catalog);
                Err(e)
            }
        }
    }

    /// Start (or restart) the production and autosave schedules.
    pub fn start(&mut self, now_ms: f64) {
        self.clock.start(now_ms);
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn click(&mut self) {
        economy::register_manual_action(&mut self.state);
    }

    /// Buy one unit of `id`. A successful purchase is persisted right away
    /// when `save_after_purchase` is on; the save outcome rides along.
    pub fn purchase(
        &mut self,
        id: &str,
        store: &mut impl ProgressStore,
    ) -> Result<PurchaseOutcome, EconomyError> {
        let receipt = economy::purchase(&mut self.state, &self.catalog, id)?;
        log::debug!("{} bought {} #{} for {}", self.username, id, receipt.owned, receipt.cost);
        let saved = self.save_after_purchase.then(|| self.save(store).is_ok());
        Ok(PurchaseOutcome { receipt, saved })
    }

    /// Advance the clock to `now_ms`, apply due ticks, then autosave if due.
    pub fn pump(&mut self, now_ms: f64, store: &mut impl ProgressStore) -> PumpReport {
        let fired = self.clock.advance(now_ms);
        let tps = self.clock.ticks_per_second();
        for _ in 0..fired.ticks {
            on_tick(&mut self.state, tps);
        }
        let autosaved = if fired.autosaves > 0 {
            Some(self.save(store).is_ok())
        } else {
            None
        };
        PumpReport {
            ticks: fired.ticks,
            autosaved,
        }
    }

    pub fn snapshot(&self, at: DateTime<Utc>) -> Snapshot {
        save::serialize(&self.state, at)
    }

    /// Serialize now and hand the snapshot to the store. The snapshot is
    /// taken before the write starts, so it always reflects the current state.
    pub fn save(&mut self, store: &mut impl ProgressStore) -> Result<DateTime<Utc>, StoreError> {
        let now = Utc::now();
        let snapshot = self.snapshot(now);
        match store.persist_progress(&self.username, &snapshot) {
            Ok(()) => {
                self.last_saved = Some(now);
                Ok(now)
            }
            Err(e) => {
                log::warn!("save failed for {}, keeping in-memory progress: {e}", self.username);
                Err(e)
            }
        }
    }

    /// End the session: halt both schedules, then write a final save.
    pub fn shutdown(mut self, store: &mut impl ProgressStore) -> Result<(), StoreError> {
        self.stop();
        self.save(store)?;
        log::info!("session closed for {}", self.username);
        Ok(())
    }

    pub fn cost_of(&self, id: &str) -> Result<f64, EconomyError> {
        economy::cost_of(&self.state, &self.catalog, id)
    }

    pub fn can_afford(&self, id: &str) -> bool {
        economy::can_afford(&self.state, &self.catalog, id).unwrap_or(false)
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    #[cfg(test)]
    pub fn total_ticks(&self) -> u64 {
        self.clock.total_ticks
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    /// In-memory progress store with switchable write failures.
    #[derive(Default)]
    pub(crate) struct MemoryProgress {
        pub saves: HashMap<String, String>,
        pub writes: u32,
        pub fail_writes: bool,
    }

    impl ProgressStore for MemoryProgress {
        fn fetch_progress(&mut self, username: &str) -> Result<String, StoreError> {
            self.saves.get(username).cloned().ok_or_else(|| StoreError::NotFound {
                username: username.to_string(),
            })
        }

        fn persist_progress(&mut self, username: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Unavailable("disk full".into()));
            }
            self.writes += 1;
            self.saves.insert(username.to_string(), snapshot.to_json()?);
            Ok(())
        }
    }

    fn engine() -> Engine {
        Engine::new(Rc::new(Catalog::standard().unwrap()), &GameConfig::default(), "alice")
    }

    fn stored(store: &MemoryProgress) -> PlayerState {
        save::reconcile(store.saves.get("alice").map(String::as_str), &Catalog::standard().unwrap())
    }

    #[test]
    fn purchase_reports_save_outcome() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        for _ in 0..40 {
            e.click();
        }
        assert_eq!(e.purchase("cursor", &mut store).unwrap().saved, Some(true));

        store.fail_writes = true;
        let outcome = e.purchase("cursor", &mut store).unwrap();
        assert_eq!(outcome.saved, Some(false));
        assert_eq!(outcome.receipt.owned, 2);
    }

    #[test]
    fn purchase_without_autosave_reports_no_save() {
        let config = GameConfig {
            save_after_purchase: false,
            ..GameConfig::default()
        };
        let mut store = MemoryProgress::default();
        let mut e = Engine::new(Rc::new(Catalog::standard().unwrap()), &config, "alice");
        for _ in 0..15 {
            e.click();
        }
        assert_eq!(e.purchase("cursor", &mut store).unwrap().saved, None);
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn clicks_then_purchase() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        for _ in 0..15 {
            e.click();
        }
        let outcome = e.purchase("cursor", &mut store).unwrap();
        assert_eq!(outcome.receipt.owned, 1);
        assert!((e.state().balance - 0.0).abs() < f64::EPSILON);
        assert!((e.state().production_rate() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn purchase_saves_post_purchase_state() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        for _ in 0..20 {
            e.click();
        }
        e.purchase("cursor", &mut store).unwrap();
        let saved = stored(&store);
        assert_eq!(saved.owned("cursor"), 1);
        assert!((saved.balance - 5.0).abs() < f64::EPSILON);
        assert!(e.last_saved().is_some());
    }

    #[test]
    fn purchase_without_autosave_config_does_not_write() {
        let mut store = MemoryProgress::default();
        let config = GameConfig {
            save_after_purchase: false,
            ..GameConfig::default()
        };
        let mut e = Engine::new(Rc::new(Catalog::standard().unwrap()), &config, "alice");
        for _ in 0..15 {
            e.click();
        }
        e.purchase("cursor", &mut store).unwrap();
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn failed_purchase_changes_nothing() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        for _ in 0..10 {
            e.click();
        }
        let before = e.state().clone();
        assert!(matches!(
            e.purchase("cursor", &mut store),
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert_eq!(e.state(), &before);
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn pump_applies_ticks_only_while_running() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        e.state = PlayerState::from_parts(
            &Catalog::standard().unwrap(),
            0.0,
            0.0,
            0,
            &[("grandma".to_string(), 10)].into_iter().collect(),
        );
        assert_eq!(e.pump(1_000.0, &mut store).ticks, 0);

        e.start(1_000.0);
        let report = e.pump(1_100.0, &mut store);
        assert_eq!(report.ticks, 1);
        assert!((e.state().balance - 1.0).abs() < 1e-9);
        assert!((e.state().lifetime_earned - 1.0).abs() < 1e-9);

        e.stop();
        assert_eq!(e.pump(2_000.0, &mut store).ticks, 0);
    }

    #[test]
    fn double_start_fires_ten_ticks_per_second() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        e.start(0.0);
        e.start(0.0);
        let mut ticks = 0;
        for ms in (50..=1_000).step_by(50) {
            ticks += e.pump(ms as f64, &mut store).ticks;
        }
        assert_eq!(ticks, 10);
        assert_eq!(e.total_ticks(), 10);
    }

    #[test]
    fn autosave_fires_on_schedule() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        e.click();
        e.start(0.0);
        let mut autosaves = 0;
        for ms in (100..=5_000).step_by(100) {
            if e.pump(ms as f64, &mut store).autosaved == Some(true) {
                autosaves += 1;
            }
        }
        assert_eq!(autosaves, 1);
        assert_eq!(stored(&store).manual_actions, 1);
    }

    #[test]
    fn autosave_failure_keeps_ticking() {
        let mut store = MemoryProgress {
            fail_writes: true,
            ..MemoryProgress::default()
        };
        let mut e = engine();
        e.state = PlayerState::from_parts(
            &Catalog::standard().unwrap(),
            0.0,
            0.0,
            0,
            &[("grandma".to_string(), 1)].into_iter().collect(),
        );
        e.start(0.0);
        let mut failed = 0;
        let mut ticks = 0;
        for ms in (100..=10_000).step_by(100) {
            let report = e.pump(ms as f64, &mut store);
            ticks += report.ticks;
            if report.autosaved == Some(false) {
                failed += 1;
            }
        }
        assert_eq!(failed, 2);
        assert_eq!(ticks, 100);
        assert!(e.is_running());
        assert!((e.state().balance - 10.0).abs() < 1e-6);
    }

    #[test]
    fn load_reconciles_stored_snapshot() {
        let mut store = MemoryProgress::default();
        store.saves.insert(
            "alice".into(),
            r#"{"balance": 40, "productionRate": 12345, "owned": {"grandma": 2, "ghost": 1}}"#.into(),
        );
        let mut e = engine();
        e.load(&mut store).unwrap();
        assert!((e.state().balance - 40.0).abs() < f64::EPSILON);
        assert!((e.state().production_rate() - 2.0).abs() < f64::EPSILON);
        assert_eq!(e.state().owned_counts().len(), 8);
    }

    #[test]
    fn load_failure_starts_fresh() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        e.click();
        assert!(matches!(e.load(&mut store), Err(StoreError::NotFound { .. })));
        assert_eq!(e.state(), &PlayerState::new(&Catalog::standard().unwrap()));
    }

    #[test]
    fn save_then_load_restores_progress() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        for _ in 0..120 {
            e.click();
        }
        e.purchase("grandma", &mut store).unwrap();
        e.save(&mut store).unwrap();
        let expected = e.state().clone();

        let mut next = engine();
        next.load(&mut store).unwrap();
        assert_eq!(next.state(), &expected);
    }

    #[test]
    fn shutdown_saves_and_stops() {
        let mut store = MemoryProgress::default();
        let mut e = engine();
        e.start(0.0);
        for _ in 0..3 {
            e.click();
        }
        e.shutdown(&mut store).unwrap();
        assert_eq!(stored(&store).manual_actions, 3);
    }

    #[test]
    fn save_failure_is_reported() {
        let mut store = MemoryProgress {
            fail_writes: true,
            ..MemoryProgress::default()
        };
        let mut e = engine();
        assert!(e.save(&mut store).is_err());
        assert!(e.last_saved().is_none());
    }
}
