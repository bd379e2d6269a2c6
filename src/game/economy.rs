//! Generator economy: pure cost and production math.

use std::collections::BTreeMap;

use crate::error::EconomyError;

use super::catalog::{Catalog, GeneratorDefinition};
use super::state::PlayerState;

/// Cost multiplier applied per unit already owned.
pub const GROWTH_FACTOR: f64 = 1.15;

/// Currency granted by one manual action.
pub const MANUAL_GRANT: f64 = 1.0;

/// Result of a successful purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseReceipt {
    pub generator_id: String,
    pub cost: f64,
    /// Units owned after the purchase.
    pub owned: u32,
}

fn definition<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a GeneratorDefinition, EconomyError> {
    catalog
        .lookup(id)
        .map_err(|_| EconomyError::UnknownGenerator { id: id.to_string() })
}

/// `floor(base_cost * 1.15^owned)`.
pub fn cost_for(def: &GeneratorDefinition, owned: u32) -> f64 {
    (def.base_cost * GROWTH_FACTOR.powf(f64::from(owned))).floor()
}

/// Price of the next unit of `id`.
pub fn cost_of(state: &PlayerState, catalog: &Catalog, id: &str) -> Result<f64, EconomyError> {
    let def = definition(catalog, id)?;
    Ok(cost_for(def, state.owned(id)))
}

pub fn can_afford(state: &PlayerState, catalog: &Catalog, id: &str) -> Result<bool, EconomyError> {
    Ok(state.balance >= cost_of(state, catalog, id)?)
}

/// Buy one unit of `id`. The state is untouched unless the purchase succeeds.
pub fn purchase(
    state: &mut PlayerState,
    catalog: &Catalog,
    id: &str,
) -> Result<PurchaseReceipt, EconomyError> {
    let cost = cost_of(state, catalog, id)?;
    if state.balance < cost {
        return Err(EconomyError::InsufficientFunds {
            cost,
            balance: state.balance,
        });
    }

    state.balance -= cost;
    let count = state.owned.entry(id.to_string()).or_insert(0);
    *count += 1;
    let owned = *count;
    state.production_rate = recompute_production_rate(&state.owned, catalog);

    Ok(PurchaseReceipt {
        generator_id: id.to_string(),
        cost,
        owned,
    })
}

/// Sum of `owned * rate` in catalog order. Always a full recomputation so the
/// cache cannot accumulate floating-point drift.
pub fn recompute_production_rate(owned: &BTreeMap<String, u32>, catalog: &Catalog) -> f64 {
    catalog
        .definitions()
        .iter()
        .map(|d| f64::from(owned.get(&d.id).copied().unwrap_or(0)) * d.rate)
        .sum()
}

/// Manual click: fixed grant to balance and lifetime, counted.
pub fn register_manual_action(state: &mut PlayerState) {
    state.balance += MANUAL_GRANT;
    state.lifetime_earned += MANUAL_GRANT;
    state.manual_actions += 1;
}
