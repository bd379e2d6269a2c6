//! Generator catalog: the fixed, ordered list of things a player can buy.
//!
//! The catalog is the only place generator identifiers are defined. It is
//! built once at startup and never mutated afterwards.

use std::collections::HashSet;

use crate::error::CatalogError;

/// A purchasable production source.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorDefinition {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    /// Cost of the first unit.
    pub base_cost: f64,
    /// Currency per second contributed by each owned unit.
    pub rate: f64,
}

impl GeneratorDefinition {
    pub fn new(id: &str, name: &str, icon: &str, description: &str, base_cost: f64, rate: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            description: description.to_string(),
            base_cost,
            rate,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    definitions: Vec<GeneratorDefinition>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and non-positive costs.
    pub fn new(definitions: Vec<GeneratorDefinition>) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateId { id: def.id.clone() });
            }
            if !(def.base_cost.is_finite() && def.base_cost > 0.0) {
                return Err(CatalogError::InvalidBaseCost {
                    id: def.id.clone(),
                    base_cost: def.base_cost,
                });
            }
            if !(def.rate.is_finite() && def.rate >= 0.0) {
                return Err(CatalogError::InvalidRate {
                    id: def.id.clone(),
                    rate: def.rate,
                });
            }
        }
        Ok(Self { definitions })
    }

    /// The shipped generator lineup.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(vec![
            GeneratorDefinition::new("cursor", "Cursor", "👆", "Auto-clicks the cookie", 15.0, 0.1),
            GeneratorDefinition::new("grandma", "Grandma", "👵", "A nice grandma to bake cookies", 100.0, 1.0),
            GeneratorDefinition::new("farm", "Farm", "🚜", "Grows cookie plants", 1_100.0, 8.0),
            GeneratorDefinition::new("mine", "Mine", "⛏", "Mines cookie dough", 12_000.0, 47.0),
            GeneratorDefinition::new("factory", "Factory", "🏭", "Produces cookies en masse", 130_000.0, 260.0),
            GeneratorDefinition::new("bank", "Bank", "🏦", "Generates cookie assets", 1_400_000.0, 1_400.0),
            GeneratorDefinition::new("temple", "Temple", "🛕", "Summons cookie gods", 20_000_000.0, 7_800.0),
            GeneratorDefinition::new("wizard", "Wizard Tower", "🧙", "Transmutes cookies from thin air", 330_000_000.0, 44_000.0),
        ])
    }

    /// All definitions in display order.
    pub fn definitions(&self) -> &[GeneratorDefinition] {
        &self.definitions
    }

    pub fn lookup(&self, id: &str) -> Result<&GeneratorDefinition, CatalogError> {
        self.definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }
}
