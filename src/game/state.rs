//! Player progress: the only mutable game data.

use std::collections::BTreeMap;

use super::catalog::Catalog;
use super::economy::recompute_production_rate;

/// Progress of one player.
///
/// `production_rate` is a cache of `Σ owned[g] * rate[g]`. It is private so
/// that it can only change together with `owned`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Spendable currency. Never negative.
    pub balance: f64,
    /// Everything ever gained, manual and passive. Never decreases.
    pub lifetime_earned: f64,
    /// Number of manual grants.
    pub manual_actions: u64,
    pub(super) production_rate: f64,
    /// Units owned per generator id. Keys are exactly the catalog's ids.
    pub(super) owned: BTreeMap<String, u32>,
}

impl PlayerState {
    /// Fresh state: zero balance, zero of every generator.
    pub fn new(catalog: &Catalog) -> Self {
        let owned = catalog
            .definitions()
            .iter()
            .map(|d| (d.id.clone(), 0))
            .collect();
        Self {
            balance: 0.0,
            lifetime_earned: 0.0,
            manual_actions: 0,
            production_rate: 0.0,
            owned,
        }
    }

    /// Assemble a state from stored values. `owned` is filtered to the
    /// catalog (missing ids become 0, unknown ids are dropped) and the
    /// production rate is recomputed.
    pub fn from_parts(
        catalog: &Catalog,
        balance: f64,
        lifetime_earned: f64,
        manual_actions: u64,
        owned: &BTreeMap<String, u32>,
    ) -> Self {
        let owned: BTreeMap<String, u32> = catalog
            .definitions()
            .iter()
            .map(|d| (d.id.clone(), owned.get(&d.id).copied().unwrap_or(0)))
            .collect();
        let production_rate = recompute_production_rate(&owned, catalog);
        Self {
            balance,
            lifetime_earned,
            manual_actions,
            production_rate,
            owned,
        }
    }

    /// Total currency per second across all owned generators.
    pub fn production_rate(&self) -> f64 {
        self.production_rate
    }

    /// Units owned of `id` (0 for ids outside the catalog).
    pub fn owned(&self, id: &str) -> u32 {
        self.owned.get(id).copied().unwrap_or(0)
    }

    pub fn owned_counts(&self) -> &BTreeMap<String, u32> {
        &self.owned
    }

    /// Total generator units across all kinds.
    pub fn total_owned(&self) -> u64 {
        self.owned.values().map(|&c| c as u64).sum()
    }
}
