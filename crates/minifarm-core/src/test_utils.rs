//! Shared test helpers for integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these
//! helpers are available in unit tests and integration tests (via the
//! `test-utils` feature).

use crate::fixed::{seconds, Seconds};
use crate::id::FactoryId;
use crate::ledger::ResourceLedger;
use crate::orchestrator::FactoryOrchestrator;
use crate::recipe::{FactoryConfig, Recipe, ResourceRequirement};

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn secs(v: f64) -> Seconds {
    seconds(v)
}

// ===========================================================================
// Config constructors
// ===========================================================================

/// Infinite source: 1 Wheat every 3s, capacity 4.
pub fn wheat_field() -> FactoryConfig {
    FactoryConfig {
        name: "WheatField".to_string(),
        capacity: 4,
        recipe: Recipe {
            output_resource: "Wheat".to_string(),
            output_amount: 1,
            cycle_duration: seconds(3.0),
            requires_input: false,
            requirements: Vec::new(),
        },
    }
}

/// 2 Wheat -> 1 Flour every 5s, capacity 5.
pub fn flour_mill() -> FactoryConfig {
    FactoryConfig {
        name: "FlourMill".to_string(),
        capacity: 5,
        recipe: Recipe {
            output_resource: "Flour".to_string(),
            output_amount: 1,
            cycle_duration: seconds(5.0),
            requires_input: true,
            requirements: vec![ResourceRequirement {
                resource: "Wheat".to_string(),
                amount: 2,
            }],
        },
    }
}

/// 2 Flour + 1 Water -> 1 Bread every 8s, capacity 3.
pub fn bread_oven() -> FactoryConfig {
    FactoryConfig {
        name: "BreadOven".to_string(),
        capacity: 3,
        recipe: Recipe {
            output_resource: "Bread".to_string(),
            output_amount: 1,
            cycle_duration: seconds(8.0),
            requires_input: true,
            requirements: vec![
                ResourceRequirement {
                    resource: "Flour".to_string(),
                    amount: 2,
                },
                ResourceRequirement {
                    resource: "Water".to_string(),
                    amount: 1,
                },
            ],
        },
    }
}

// ===========================================================================
// Ledger and orchestrator builders
// ===========================================================================

pub fn ledger_with(entries: &[(&str, u32)]) -> ResourceLedger {
    let mut ledger = ResourceLedger::new();
    for (resource, amount) in entries {
        ledger.add(resource, *amount);
    }
    ledger
}

/// Orchestrator with the full wheat->flour->bread chain and a stocked
/// ledger. Returns the ids in chain order.
pub fn farm_chain() -> (FactoryOrchestrator, FactoryId, FactoryId, FactoryId) {
    let mut orch = FactoryOrchestrator::new();
    orch.add_resource("Wheat", 10);
    orch.add_resource("Water", 10);
    let field = orch
        .create_factory(wheat_field())
        .expect("valid wheat field config");
    let mill = orch
        .create_factory(flour_mill())
        .expect("valid flour mill config");
    let oven = orch
        .create_factory(bread_oven())
        .expect("valid bread oven config");
    (orch, field, mill, oven)
}
