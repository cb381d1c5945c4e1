//! The factory orchestrator: entry point for every simulation mutation.
//!
//! Owns the ledger, the event bus, and all live factories. Ledger access
//! is passed explicitly into factory operations -- there is no ambient
//! resource singleton, and the orchestrator never keeps a shadow copy of
//! quantities. Because every operation holds `&mut self`, the
//! check-then-act sequences inside admission are atomic with respect to
//! the ledger by construction.
//!
//! Each public mutation emits its change notifications and flushes the
//! bus before returning, so subscribers always observe a settled state.

use crate::event::{Event, EventBus, EventKind, PassiveListener};
use crate::factory::{
    ElapsedOutcome, Factory, FactoryStatus, OrderOutcome, RemoveOutcome, StopReason,
};
use crate::fixed::{seconds_from_wall_clock, Seconds};
use crate::id::{FactoryId, ResourceName};
use crate::ledger::ResourceLedger;
use crate::recipe::{ConfigError, FactoryConfig, Recipe};
use slotmap::SlotMap;
use std::collections::BTreeMap;

/// Offline gaps shorter than this are negligible: no catch-up is
/// performed, avoiding spurious single-tick artifacts right after load.
const MIN_OFFLINE_GAP: Seconds = Seconds::ONE;

/// Aggregate result of an [`FactoryOrchestrator::advance`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    /// Factories whose timer was running when the tick arrived.
    pub factories_advanced: usize,
    /// Timer cycles completed across all factories (before clamping).
    pub cycles_completed: u64,
    /// Output units that actually landed in stock.
    pub units_produced: u64,
}

/// Aggregates every production unit, admits orders against the ledger,
/// and resolves collection of finished stock back into it.
#[derive(Debug, Default)]
pub struct FactoryOrchestrator {
    pub(crate) ledger: ResourceLedger,
    pub(crate) factories: SlotMap<FactoryId, Factory>,
    bus: EventBus,
}

impl FactoryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Reads ---------------------------------------------------------------

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Detached copy of the ledger for display/persistence.
    pub fn resources(&self) -> BTreeMap<ResourceName, u32> {
        self.ledger.snapshot()
    }

    pub fn factory(&self, id: FactoryId) -> Option<&Factory> {
        self.factories.get(id)
    }

    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    pub fn factory_ids(&self) -> impl Iterator<Item = FactoryId> + '_ {
        self.factories.keys()
    }

    /// Factories are addressable by config name; saved records reference
    /// names, not runtime ids.
    pub fn find_by_name(&self, name: &str) -> Option<FactoryId> {
        self.factories
            .iter()
            .find(|(_, f)| f.name() == name)
            .map(|(id, _)| id)
    }

    pub fn status(&self, id: FactoryId) -> Option<FactoryStatus> {
        self.factories.get(id).map(Factory::status)
    }

    /// Pull read for display; correctness never polls this.
    pub fn remaining_time(&self, id: FactoryId) -> Option<Seconds> {
        self.factories.get(id).map(Factory::remaining_time)
    }

    /// Admission preview for UI controls. Pure read, no side effects.
    pub fn can_add_order(&self, id: FactoryId) -> bool {
        self.factories
            .get(id)
            .is_some_and(|f| f.can_add_order(&self.ledger))
    }

    // -- Event bus -----------------------------------------------------------

    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.bus.on_passive(kind, listener);
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.bus.suppress(kind);
    }

    // -- Ledger mutations ----------------------------------------------------

    /// Seed a resource quantity (new game bootstrap, debug commands).
    pub fn add_resource(&mut self, resource: &str, amount: u32) {
        self.ledger.add(resource, amount);
        self.emit_resources_changed();
        self.bus.deliver();
    }

    // -- Factory lifecycle ---------------------------------------------------

    /// Instantiate a factory at stock 0, queue 0, not producing. A
    /// misconfigured template fails loudly here.
    pub fn create_factory(&mut self, config: FactoryConfig) -> Result<FactoryId, ConfigError> {
        let factory = Factory::new(config)?;
        let id = self.factories.insert(factory);
        self.bus.emit(Event::FactoryCreated { factory: id });
        self.bus.deliver();
        Ok(id)
    }

    /// Destroy a factory. Stops its timer first; the preserved remaining
    /// time travels with the returned state should the caller persist it.
    pub fn destroy_factory(&mut self, id: FactoryId) -> Option<Factory> {
        let mut factory = self.factories.remove(id)?;
        if factory.is_producing() {
            factory.cancel();
            self.bus.emit(Event::ProductionStopped {
                factory: id,
                reason: StopReason::Cancelled,
            });
            self.bus.deliver();
        }
        Some(factory)
    }

    /// Replace a factory's recipe wholesale. `None` for an unknown
    /// factory.
    pub fn set_recipe(
        &mut self,
        id: FactoryId,
        recipe: Recipe,
    ) -> Option<Result<(), ConfigError>> {
        Some(self.factories.get_mut(id)?.set_recipe(recipe))
    }

    // -- Orders and collection ----------------------------------------------

    /// Admit one order for a factory, consuming its requirements.
    pub fn add_order(&mut self, id: FactoryId) -> OrderOutcome {
        let Some(factory) = self.factories.get_mut(id) else {
            return OrderOutcome::UnknownFactory;
        };
        let was_producing = factory.is_producing();
        let outcome = factory.add_order(&mut self.ledger);
        if outcome == OrderOutcome::Accepted {
            let queue = factory.production_queue();
            let consumed_inputs = factory.recipe().requires_input;
            let started = !was_producing && factory.is_producing();
            self.bus.emit(Event::QueueChanged { factory: id, queue });
            if started {
                self.bus.emit(Event::ProductionStarted { factory: id });
            }
            if consumed_inputs {
                self.emit_resources_changed();
            }
            self.bus.deliver();
        }
        outcome
    }

    /// Withdraw one order, refunding its requirements exactly.
    pub fn remove_order(&mut self, id: FactoryId) -> RemoveOutcome {
        let Some(factory) = self.factories.get_mut(id) else {
            return RemoveOutcome::UnknownFactory;
        };
        let was_producing = factory.is_producing();
        let outcome = factory.remove_order(&mut self.ledger);
        if outcome == RemoveOutcome::Removed {
            let queue = factory.production_queue();
            let refunded = !factory.recipe().requirements.is_empty();
            let stopped = was_producing && !factory.is_producing();
            self.bus.emit(Event::QueueChanged { factory: id, queue });
            if stopped {
                self.bus.emit(Event::ProductionStopped {
                    factory: id,
                    reason: StopReason::Cancelled,
                });
            }
            if refunded {
                self.emit_resources_changed();
            }
            self.bus.deliver();
        }
        outcome
    }

    /// Collect finished stock into the ledger. Returns the amount
    /// collected (0 for an unknown factory or empty stock).
    pub fn collect(&mut self, id: FactoryId) -> u32 {
        let Some(factory) = self.factories.get_mut(id) else {
            return 0;
        };
        let was_producing = factory.is_producing();
        let collected = factory.collect(&mut self.ledger);
        if collected > 0 {
            self.bus.emit(Event::StockChanged {
                factory: id,
                stock: 0,
            });
            self.bus.emit(Event::ItemsCollected {
                factory: id,
                quantity: collected,
            });
            self.emit_resources_changed();
        }
        if !was_producing && self.factories[id].is_producing() {
            self.bus.emit(Event::ProductionStarted { factory: id });
        }
        if collected > 0 || (!was_producing && self.factories[id].is_producing()) {
            self.bus.deliver();
        }
        collected
    }

    /// Cancel a factory's timer without touching stock or queue.
    pub fn cancel(&mut self, id: FactoryId) {
        if let Some(factory) = self.factories.get_mut(id) {
            if factory.is_producing() {
                factory.cancel();
                self.bus.emit(Event::ProductionStopped {
                    factory: id,
                    reason: StopReason::Cancelled,
                });
                self.bus.deliver();
            }
        }
    }

    // -- Time ----------------------------------------------------------------

    /// Advance every producing factory by `dt`. Uses the same clamped
    /// cycle math as offline catch-up, so an arbitrarily large `dt`
    /// (time-scale fast-forward) lands exactly where second-by-second
    /// ticking would.
    pub fn advance(&mut self, dt: Seconds) -> AdvanceSummary {
        let mut summary = AdvanceSummary::default();
        if dt <= Seconds::ZERO {
            return summary;
        }
        let ids: Vec<FactoryId> = self.factories.keys().collect();
        for id in ids {
            let Some(factory) = self.factories.get_mut(id) else {
                continue;
            };
            if !factory.is_producing() {
                continue;
            }
            summary.factories_advanced += 1;
            let outcome = factory.apply_elapsed(dt);
            summary.cycles_completed += outcome.cycles_elapsed;
            summary.units_produced += u64::from(outcome.produced);
            self.emit_elapsed_events(id, &outcome);
        }
        self.bus.deliver();
        summary
    }

    /// Apply an offline gap to one factory. `elapsed_seconds` comes from
    /// wall-clock subtraction and is sanitized (NaN/negative become
    /// zero); gaps under one second are skipped entirely.
    ///
    /// Returns what happened, or `None` for an unknown factory.
    pub fn apply_offline_elapsed(
        &mut self,
        id: FactoryId,
        elapsed_seconds: f64,
    ) -> Option<ElapsedOutcome> {
        let factory = self.factories.get_mut(id)?;
        let elapsed = seconds_from_wall_clock(elapsed_seconds);
        if elapsed < MIN_OFFLINE_GAP {
            return Some(ElapsedOutcome::default());
        }
        let outcome = factory.apply_elapsed(elapsed);
        self.emit_elapsed_events(id, &outcome);
        self.bus.deliver();
        Some(outcome)
    }

    // -- Internal ------------------------------------------------------------

    fn emit_elapsed_events(&mut self, id: FactoryId, outcome: &ElapsedOutcome) {
        if outcome.produced > 0 {
            let factory = &self.factories[id];
            self.bus.emit(Event::CycleCompleted {
                factory: id,
                cycles: outcome.cycles_elapsed,
                produced: outcome.produced,
            });
            self.bus.emit(Event::StockChanged {
                factory: id,
                stock: factory.current_stock(),
            });
            if outcome.queue_consumed > 0 {
                self.bus.emit(Event::QueueChanged {
                    factory: id,
                    queue: factory.production_queue(),
                });
            }
        }
        if let Some(reason) = outcome.stopped {
            self.bus.emit(Event::ProductionStopped {
                factory: id,
                reason,
            });
        }
    }

    pub(crate) fn emit_resources_changed(&mut self) {
        self.bus.emit(Event::ResourcesChanged {
            resources: self.ledger.snapshot(),
        });
    }

    pub(crate) fn deliver_events(&mut self) {
        self.bus.deliver();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
