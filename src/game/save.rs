//! Snapshot conversion: serialize live state, reconcile stored saves.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current snapshot format. Bump it when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest format that can still be read. Bump it
//!   only for breaking changes (a field removed or its meaning changed).
//!   Saves below it start fresh.
//! - A save without a `version` field comes from the legacy JavaScript game
//!   (`cookies`, `totalClicks`, `upgrades` ...) and is read through aliases.
//!
//! Reading is lenient field by field. A missing or malformed field becomes 0.
//! Generators absent from the catalog are dropped, and catalog generators
//! absent from the save start at 0. `productionRate` is a derived cache, so it
//! is always recomputed from the owned counts. Only input that is not a JSON
//! object starts fresh.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

use super::catalog::Catalog;
use super::state::PlayerState;

/// Current snapshot format. Bump when fields are added.
pub const SAVE_VERSION: u32 = 1;

/// Oldest snapshot format that can be loaded.
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Owned copy of the persisted state. Holds no references into the live
/// `PlayerState`, so later mutation does not affect it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub balance: f64,
    pub manual_actions: u64,
    pub lifetime_earned: f64,
    pub production_rate: f64,
    pub owned: BTreeMap<String, u32>,
    pub last_saved_timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    #[cfg(test)]
    pub fn to_value(&self) -> Result<serde_json::Value, StoreError> {
        Ok(serde_json::to_value(self)?)
    }
}

pub fn serialize(state: &PlayerState, saved_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        version: SAVE_VERSION,
        balance: state.balance,
        manual_actions: state.manual_actions,
        lifetime_earned: state.lifetime_earned,
        production_rate: state.production_rate(),
        owned: state.owned_counts().clone(),
        last_saved_timestamp: saved_at,
    }
}

/// Rebuild a `PlayerState` from a stored JSON snapshot.
pub fn reconcile(raw: Option<&str>, catalog: &Catalog) -> PlayerState {
    let Some(raw) = raw else {
        log::info!("no saved progress; starting fresh");
        return PlayerState::new(catalog);
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("saved progress is unreadable, starting fresh: {e}");
            return PlayerState::new(catalog);
        }
    };
    let Some(fields) = value.as_object() else {
        log::warn!("saved progress is not an object, starting fresh");
        return PlayerState::new(catalog);
    };

    match fields.get("version") {
        None => log::info!("migrating legacy save (no version field)"),
        Some(v) => match v.as_u64() {
            Some(v) if v < u64::from(MIN_COMPATIBLE_VERSION) => {
                log::warn!(
                    "save version {v} is older than {MIN_COMPATIBLE_VERSION}; starting fresh"
                );
                return PlayerState::new(catalog);
            }
            Some(v) if v > u64::from(SAVE_VERSION) => {
                log::warn!("save version {v} is newer than {SAVE_VERSION}; loading known fields")
            }
            Some(_) => {}
            None => log::warn!("ignoring malformed save version {v}"),
        },
    }

    let owned = match field(fields, "owned", "upgrades") {
        Some(Value::Object(counts)) => reconcile_owned(counts, catalog),
        Some(other) => {
            log::warn!("ignoring malformed owned counts: {other}");
            BTreeMap::new()
        }
        None => BTreeMap::new(),
    };

    PlayerState::from_parts(
        catalog,
        sanitize_amount(number_field(fields, "balance", "cookies")),
        sanitize_amount(number_field(fields, "lifetimeEarned", "allTimeCookies")),
        read_manual_actions(fields),
        &owned,
    )
}

fn reconcile_owned(counts: &Map<String, Value>, catalog: &Catalog) -> BTreeMap<String, u32> {
    counts
        .iter()
        .filter_map(|(id, count)| {
            if catalog.lookup(id).is_err() {
                log::info!("dropping unknown generator `{id}` from save");
                return None;
            }
            Some((id.clone(), read_count(count)))
        })
        .collect()
}

/// The current name wins over the legacy alias when both are present.
fn field<'a>(fields: &'a Map<String, Value>, name: &str, alias: &str) -> Option<&'a Value> {
    fields.get(name).or_else(|| fields.get(alias))
}

/// First of `name`/`alias` that holds a usable number.
fn number_field(fields: &Map<String, Value>, name: &str, alias: &str) -> Option<f64> {
    fields
        .get(name)
        .and_then(as_number)
        .or_else(|| fields.get(alias).and_then(as_number))
}

/// Numbers, and strings holding a number.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Exact integer first; fractional legacy values are floored.
fn read_manual_actions(fields: &Map<String, Value>) -> u64 {
    ["manualActions", "totalClicks"]
        .iter()
        .filter_map(|key| fields.get(*key))
        .find_map(|v| {
            as_integer(v).or_else(|| as_number(v).map(|n| sanitize_amount(Some(n)).floor() as u64))
        })
        .unwrap_or(0)
}

fn read_count(value: &Value) -> u32 {
    match as_integer(value) {
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
        None => sanitize_amount(as_number(value)).floor().min(f64::from(u32::MAX)) as u32,
    }
}

/// Missing, negative and non-finite values become 0.
fn sanitize_amount(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}


#[cfg(test)]
mod proptests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn prop_reconcile_inverts_serialize(
            balance in 0.0f64..1e15,
            lifetime in 0.0f64..1e15,
            manual in any::<u64>(),
            counts in proptest::collection::vec(0u32..5_000, 8),
        ) {
            let catalog = Catalog::standard().unwrap();
            let owned: BTreeMap<String, u32> = catalog
                .definitions()
                .iter()
                .zip(counts)
                .map(|(d, c)| (d.id.clone(), c))
                .collect();
            let state = PlayerState::from_parts(&catalog, balance, lifetime, manual, &owned);
            let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

            let json = serialize(&state, at).to_json().unwrap();
            prop_assert_eq!(reconcile(Some(&json), &catalog), state);
        }
    }
}
