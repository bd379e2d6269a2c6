//! Fixed-timestep simulation clock using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. The clock converts this
//! into a whole number of production ticks (and, on a slower cadence,
//! autosaves) so the game logic stays deterministic and fully testable.
//!
//! Each fired tick grants a fixed fraction of the production rate. Elapsed
//! time is clamped per frame, so a stalled tab loses income instead of
//! catching up in one burst.

use super::state::PlayerState;

/// One periodic schedule: converts elapsed milliseconds into firings.
#[derive(Clone, Debug)]
struct Schedule {
    interval_ms: f64,
    /// Milliseconds not yet consumed as firings.
    accumulator: f64,
    /// Timestamp of the last update (ms).
    last_timestamp: f64,
}

impl Schedule {
    fn new(interval_ms: f64, now_ms: f64) -> Self {
        Self {
            interval_ms,
            accumulator: 0.0,
            last_timestamp: now_ms,
        }
    }

    fn advance(&mut self, now_ms: f64, max_delta_ms: f64) -> u32 {
        // Clamp to avoid spiral-of-death if tab was backgrounded
        let delta = (now_ms - self.last_timestamp).clamp(0.0, max_delta_ms);
        self.last_timestamp = now_ms;

        self.accumulator += delta;
        let fired = (self.accumulator / self.interval_ms) as u32;
        self.accumulator -= fired as f64 * self.interval_ms;
        fired
    }
}

/// Firings produced by one [`SimulationClock::advance`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fired {
    pub ticks: u32,
    pub autosaves: u32,
}

/// Production-tick and autosave schedules for a single engine.
///
/// Holding each schedule in an `Option` makes "at most one active schedule"
/// structural: `start` replaces, `stop` clears.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    ticks_per_second: u32,
    tick_interval_ms: f64,
    autosave_interval_ms: f64,
    max_delta_ms: f64,
    production: Option<Schedule>,
    autosave: Option<Schedule>,
    /// Total production ticks fired since creation.
    pub total_ticks: u64,
}

impl SimulationClock {
    pub fn new(ticks_per_second: u32, autosave_interval_ms: u32, max_delta_ms: f64) -> Self {
        let ticks_per_second = ticks_per_second.max(1);
        Self {
            ticks_per_second,
            tick_interval_ms: 1000.0 / ticks_per_second as f64,
            autosave_interval_ms: f64::from(autosave_interval_ms.max(1)),
            max_delta_ms,
            production: None,
            autosave: None,
            total_ticks: 0,
        }
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Begin both schedules at `now_ms`. Calling this while running discards
    /// the existing schedules first, so timers never stack up.
    pub fn start(&mut self, now_ms: f64) {
        self.stop();
        self.production = Some(Schedule::new(self.tick_interval_ms, now_ms));
        self.autosave = Some(Schedule::new(self.autosave_interval_ms, now_ms));
    }

    /// Cancel both schedules. No-op when already stopped.
    pub fn stop(&mut self) {
        self.production = None;
        self.autosave = None;
    }

    pub fn is_running(&self) -> bool {
        self.production.is_some()
    }

    /// Feed a wall-clock timestamp (from `performance.now()` or similar).
    /// Returns how many ticks and autosaves are due. Always zero when stopped.
    pub fn advance(&mut self, now_ms: f64) -> Fired {
        let max_delta = self.max_delta_ms;
        let ticks = self
            .production
            .as_mut()
            .map_or(0, |s| s.advance(now_ms, max_delta));
        let autosaves = self
            .autosave
            .as_mut()
            .map_or(0, |s| s.advance(now_ms, max_delta));
        self.total_ticks += ticks as u64;
        Fired { ticks, autosaves }
    }
}

/// One production tick: grant `production_rate / ticks_per_second`.
pub fn on_tick(state: &mut PlayerState, ticks_per_second: u32) {
    let rate = state.production_rate();
    if rate <= 0.0 {
        return;
    }
    let grant = rate / ticks_per_second.max(1) as f64;
    state.balance += grant;
    state.lifetime_earned += grant;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::game::catalog::Catalog;

    fn clock() -> SimulationClock {
        SimulationClock::new(10, 5_000, 500.0)
    }

    #[test]
    fn stopped_clock_never_fires() {
        let mut c = clock();
        assert_eq!(c.advance(0.0), Fired::default());
        assert_eq!(c.advance(10_000.0), Fired::default());
        assert!(!c.is_running());
    }

    #[test]
    fn one_tick_at_100ms() {
        let mut c = clock();
        c.start(0.0);
        assert_eq!(c.advance(100.0).ticks, 1);
        assert_eq!(c.total_ticks, 1);
    }

    #[test]
    fn remainder_carried_over() {
        let mut c = clock();
        c.start(0.0);
        assert_eq!(c.advance(150.0).ticks, 1); // 50ms remainder
        assert_eq!(c.advance(200.0).ticks, 1); // 50 + 50
        assert_eq!(c.total_ticks, 2);
    }

    #[test]
    fn sub_tick_frames_accumulate() {
        let mut c = clock();
        c.start(0.0);
        for frame in 1..=6 {
            assert_eq!(c.advance(frame as f64 * 16.0).ticks, 0);
        }
        assert_eq!(c.advance(112.0).ticks, 1);
    }

    #[test]
    fn steady_60fps_for_one_second() {
        let mut c = clock();
        c.start(0.0);
        let mut total = 0;
        for i in 1..=60 {
            total += c.advance(i as f64 * 16.667).ticks;
        }
        assert!((9..=11).contains(&total), "expected ~10 ticks, got {}", total);
    }

    #[test]
    fn stall_is_clamped() {
        let mut c = clock();
        c.start(0.0);
        // 10 second gap (tab backgrounded) → clamped to 500ms = 5 ticks
        assert_eq!(c.advance(10_000.0).ticks, 5);
    }

    #[test]
    fn double_start_keeps_a_single_schedule() {
        let mut c = clock();
        c.start(0.0);
        c.start(0.0);
        let mut total = 0;
        for ms in (100..=1_000).step_by(100) {
            total += c.advance(ms as f64).ticks;
        }
        assert_eq!(total, 10);
    }

    #[test]
    fn restart_resets_the_timeline() {
        let mut c = clock();
        c.start(0.0);
        c.advance(450.0);
        c.start(450.0);
        // Leftover 50ms from the first schedule is discarded.
        assert_eq!(c.advance(500.0).ticks, 0);
        assert_eq!(c.advance(550.0).ticks, 1);
    }

    #[test]
    fn no_tick_after_stop() {
        let mut c = clock();
        c.start(0.0);
        assert_eq!(c.advance(300.0).ticks, 3);
        c.stop();
        c.stop(); // safe when already stopped
        assert_eq!(c.advance(600.0), Fired::default());
    }

    #[test]
    fn autosave_every_five_seconds() {
        let mut c = clock();
        c.start(0.0);
        let mut ticks = 0;
        let mut saves = 0;
        for ms in (100..=10_000).step_by(100) {
            let fired = c.advance(ms as f64);
            ticks += fired.ticks;
            saves += fired.autosaves;
        }
        assert_eq!(ticks, 100);
        assert_eq!(saves, 2);
    }

    #[test]
    fn on_tick_grants_rate_fraction() {
        let catalog = Catalog::standard().unwrap();
        let owned = BTreeMap::from([("grandma".to_string(), 10)]);
        let mut state = PlayerState::from_parts(&catalog, 0.0, 0.0, 0, &owned);
        assert!((state.production_rate() - 10.0).abs() < f64::EPSILON);

        on_tick(&mut state, 10);
        assert!((state.balance - 1.0).abs() < 1e-9);
        assert!((state.lifetime_earned - 1.0).abs() < 1e-9);
        assert!((state.production_rate() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn on_tick_without_generators_is_noop() {
        let catalog = Catalog::standard().unwrap();
        let mut state = PlayerState::new(&catalog);
        state.balance = 3.0;
        let before = state.clone();
        on_tick(&mut state, 10);
        assert_eq!(state, before);
    }
}
