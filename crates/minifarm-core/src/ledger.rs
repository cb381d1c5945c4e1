//! The resource ledger: authoritative mapping from resource name to
//! stored quantity.
//!
//! All raw-material consumption and finished-goods production flows
//! through this type. Quantities are `u32`, so non-negativity is a type
//! invariant; `consume` rejects a shortfall wholesale, so the subtraction
//! below never underflows.
//!
//! The ledger is the single shared mutable in the simulation. `&mut self`
//! on every mutator is the serialization point: a check-then-act sequence
//! (all-or-nothing order admission) runs inside one orchestrator
//! operation holding exclusive access, so no interleaved consume can
//! invalidate a passed `has_enough` check.

use crate::id::ResourceName;
use std::collections::BTreeMap;

/// Authoritative store of resource quantities.
///
/// `BTreeMap` rather than `HashMap`: snapshots and change notifications
/// iterate the ledger, and deterministic ordering keeps serialized saves
/// byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceLedger {
    resources: BTreeMap<ResourceName, u32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the stored quantity is at least `amount`. A missing
    /// resource is treated as 0. Pure read, no side effects.
    pub fn has_enough(&self, resource: &str, amount: u32) -> bool {
        self.amount(resource) >= amount
    }

    /// Current quantity of a resource (0 if absent). Pure read.
    pub fn amount(&self, resource: &str) -> u32 {
        self.resources.get(resource).copied().unwrap_or(0)
    }

    /// Consume `amount` of a resource. No-op returning `false` when the
    /// stored quantity is insufficient; never a partial decrement.
    ///
    /// Callers doing admission control must check `has_enough` for every
    /// requirement before consuming any of them -- `consume` itself
    /// reports only whole success or whole failure.
    #[must_use = "a false return means nothing was consumed"]
    pub fn consume(&mut self, resource: &str, amount: u32) -> bool {
        match self.resources.get_mut(resource) {
            Some(stored) if *stored >= amount => {
                *stored -= amount;
                true
            }
            _ => false,
        }
    }

    /// Add `amount` of a resource, creating the entry at 0 if absent.
    /// Saturates at `u32::MAX` rather than wrapping.
    pub fn add(&mut self, resource: &str, amount: u32) {
        let entry = self.resources.entry(resource.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Overwrite a resource quantity. Used by snapshot restore.
    pub fn set(&mut self, resource: &str, amount: u32) {
        self.resources.insert(resource.to_string(), amount);
    }

    /// Detached copy of the full ledger for persistence or display.
    /// Never aliases internal storage.
    pub fn snapshot(&self) -> BTreeMap<ResourceName, u32> {
        self.resources.clone()
    }

    /// Number of distinct resource entries (including zeroed ones).
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
