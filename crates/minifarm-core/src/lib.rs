//! MiniFarm Core -- the production simulation for idle farming games.
//!
//! This crate provides the resource ledger, per-factory production state
//! machines, the offline catch-up calculator, and the orchestrator that
//! ties them together, all on deterministic fixed-point time.
//!
//! # Single Time-Advance Path
//!
//! Live ticking ([`orchestrator::FactoryOrchestrator::advance`]),
//! fast-forward, and offline catch-up
//! ([`orchestrator::FactoryOrchestrator::apply_offline_elapsed`]) all go
//! through [`factory::Factory::apply_elapsed`], which delegates the cycle
//! math to [`catchup::compute_completed_cycles`]. Bulk catch-up over an
//! arbitrary gap therefore lands on exactly the state incremental ticking
//! would have produced, in O(1) per factory.
//!
//! # Key Types
//!
//! - [`orchestrator::FactoryOrchestrator`] -- Owns the ledger, the event
//!   bus, and every factory; the entry point for all mutations.
//! - [`ledger::ResourceLedger`] -- Named non-negative resource
//!   quantities with all-or-nothing consumption.
//! - [`factory::Factory`] -- One production unit: stock, paid-for queue,
//!   and the cycle timer.
//! - [`recipe::Recipe`] -- What a factory produces, from what, and how
//!   long a cycle takes.
//! - [`catchup::compute_completed_cycles`] -- Pure O(1) cycle math for
//!   elapsed intervals.
//! - [`fixed::Seconds`] -- Q32.32 fixed-point time for deterministic math.
//! - [`event::EventBus`] -- Buffered change notifications for passive
//!   subscribers.
//! - [`snapshot`] -- Versioned save-game persistence via bitcode, with a
//!   JSON debug form.

pub mod catchup;
pub mod event;
pub mod factory;
pub mod fixed;
pub mod id;
pub mod ledger;
pub mod orchestrator;
pub mod recipe;
pub mod snapshot;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
