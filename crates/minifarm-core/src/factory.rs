//! Per-factory production state machine.
//!
//! One `Factory` struct parameterized by a [`Recipe`] replaces the
//! subtype-per-product hierarchy this design descends from: all
//! production behavior is data, dispatched by `recipe.requires_input`
//! and the queue/stock counters.
//!
//! The factory is the single authority on its own fields. The ledger is
//! always passed in explicitly; the factory holds no resource state of
//! its own beyond finished stock and the paid-for queue.

use crate::catchup::compute_completed_cycles;
use crate::fixed::Seconds;
use crate::ledger::ResourceLedger;
use crate::recipe::{ConfigError, FactoryConfig, Recipe};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Result of an `add_order` attempt. Every rejection is a no-op on both
/// the factory and the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    Accepted,
    /// Stock already at capacity.
    StockFull,
    /// `queue + stock + output_amount` would exceed capacity.
    WouldExceedCapacity,
    /// At least one requirement is short in the ledger. Nothing was
    /// consumed (all-or-nothing admission).
    MissingInput,
    /// The id passed to the orchestrator resolves to no live factory.
    UnknownFactory,
}

/// Result of a `remove_order` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// One order's worth of output units was removed and its inputs
    /// refunded in full.
    Removed,
    /// Queue holds less than one order; nothing changed.
    NothingQueued,
    UnknownFactory,
}

/// Why a factory stopped producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CapacityReached,
    QueueEmpty,
    Cancelled,
}

/// Derived view of a factory's state. Never stored; recomputed from the
/// authoritative counters on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryStatus {
    /// Stock is at capacity.
    Full,
    /// Timer is running.
    Producing,
    /// Not producing and cannot: input required but nothing queued.
    Blocked,
    /// Could produce (queue pending or infinite source) but the timer is
    /// not running.
    Idle,
}

/// What a call to [`Factory::apply_elapsed`] actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedOutcome {
    /// Cycles the timer completed (before clamping by queue/capacity).
    pub cycles_elapsed: u64,
    /// Output units added to stock.
    pub produced: u32,
    /// Output units removed from the committed queue.
    pub queue_consumed: u32,
    /// Set when the factory transitioned out of Producing.
    pub stopped: Option<StopReason>,
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Runtime state of one production unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Factory {
    name: String,
    capacity: u32,
    recipe: Recipe,
    current_stock: u32,
    production_queue: u32,
    is_producing: bool,
    remaining_time: Seconds,
}

impl Factory {
    /// Instantiate from a config: stock 0, queue 0, not producing.
    /// A misconfigured template is rejected loudly here rather than
    /// surfacing later as a stuck factory.
    pub fn new(config: FactoryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            capacity: config.capacity,
            recipe: config.recipe,
            current_stock: 0,
            production_queue: 0,
            is_producing: false,
            remaining_time: Seconds::ZERO,
        })
    }

    // -- Reads ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_stock(&self) -> u32 {
        self.current_stock
    }

    /// Output units already paid for via consumed inputs, awaiting
    /// materialization into stock.
    pub fn production_queue(&self) -> u32 {
        self.production_queue
    }

    pub fn is_producing(&self) -> bool {
        self.is_producing
    }

    /// Time to the next completion. Only meaningful while producing.
    pub fn remaining_time(&self) -> Seconds {
        self.remaining_time
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn status(&self) -> FactoryStatus {
        if self.current_stock >= self.capacity {
            FactoryStatus::Full
        } else if self.is_producing {
            FactoryStatus::Producing
        } else if self.recipe.requires_input && self.production_queue == 0 {
            FactoryStatus::Blocked
        } else {
            FactoryStatus::Idle
        }
    }

    /// Would `add_order` succeed right now? Pure read for admission UI;
    /// checks the capacity ceiling and every requirement, touches
    /// nothing.
    pub fn can_add_order(&self, ledger: &ResourceLedger) -> bool {
        if self.current_stock >= self.capacity {
            return false;
        }
        if !self.recipe.requires_input {
            return true;
        }
        let potential = self.production_queue + self.current_stock + self.recipe.output_amount;
        if potential > self.capacity {
            return false;
        }
        self.recipe
            .requirements
            .iter()
            .all(|req| ledger.has_enough(&req.resource, req.amount))
    }

    // -- Transitions ---------------------------------------------------------

    /// Idle -> Producing. Returns false (and clears the producing flag)
    /// when there is no reason to run: stock full, or input required with
    /// an empty queue.
    ///
    /// `remaining_time` is initialized to a full cycle only when zero; a
    /// preserved partial cycle resumes where it left off.
    pub fn start_production(&mut self) -> bool {
        if self.current_stock >= self.capacity {
            self.is_producing = false;
            return false;
        }
        if self.production_queue == 0 && self.recipe.requires_input {
            self.is_producing = false;
            return false;
        }
        self.is_producing = true;
        if self.remaining_time <= Seconds::ZERO {
            self.remaining_time = self.recipe.cycle_duration;
        }
        true
    }

    /// Commit one order: consume every requirement from the ledger and
    /// grow the queue by one output's worth.
    ///
    /// Admission is all-or-nothing: every requirement is checked via
    /// `has_enough` before any `consume`, so a single shortfall leaves
    /// the ledger untouched.
    pub fn add_order(&mut self, ledger: &mut ResourceLedger) -> OrderOutcome {
        if self.current_stock >= self.capacity {
            return OrderOutcome::StockFull;
        }
        if !self.recipe.requires_input {
            // Infinite source: an order is just "make sure the timer runs".
            self.start_production();
            return OrderOutcome::Accepted;
        }
        let potential = self.production_queue + self.current_stock + self.recipe.output_amount;
        if potential > self.capacity {
            return OrderOutcome::WouldExceedCapacity;
        }
        if !self
            .recipe
            .requirements
            .iter()
            .all(|req| ledger.has_enough(&req.resource, req.amount))
        {
            return OrderOutcome::MissingInput;
        }
        for req in &self.recipe.requirements {
            let consumed = ledger.consume(&req.resource, req.amount);
            debug_assert!(consumed, "consume after has_enough cannot fail");
        }
        self.production_queue += self.recipe.output_amount;
        if !self.is_producing {
            self.start_production();
        }
        OrderOutcome::Accepted
    }

    /// Reverse one order: shrink the queue by one output's worth and
    /// refund every requirement exactly. Symmetric with `add_order`.
    ///
    /// Draining the queue stops the timer for input-requiring recipes but
    /// preserves `remaining_time` -- the in-flight partial cycle resumes
    /// if another order arrives.
    pub fn remove_order(&mut self, ledger: &mut ResourceLedger) -> RemoveOutcome {
        if self.production_queue < self.recipe.output_amount {
            return RemoveOutcome::NothingQueued;
        }
        self.production_queue -= self.recipe.output_amount;
        for req in &self.recipe.requirements {
            ledger.add(&req.resource, req.amount);
        }
        if self.production_queue == 0 && self.recipe.requires_input {
            self.is_producing = false;
        }
        RemoveOutcome::Removed
    }

    /// Atomically read and zero the stock, crediting the ledger's output
    /// entry. Idempotent: a second call returns 0.
    ///
    /// Infinite-source factories with headroom restart immediately so
    /// they never sit idle with spare capacity (auto-restart behavior;
    /// see DESIGN.md).
    pub fn collect(&mut self, ledger: &mut ResourceLedger) -> u32 {
        let collected = self.current_stock;
        self.current_stock = 0;
        if collected > 0 {
            ledger.add(&self.recipe.output_resource, collected);
        }
        if !self.recipe.requires_input && self.current_stock < self.capacity && !self.is_producing
        {
            self.start_production();
        }
        collected
    }

    /// Any state -> Idle. Preserves the accrued `remaining_time` for
    /// later resumption or offline catch-up.
    pub fn cancel(&mut self) {
        self.is_producing = false;
    }

    /// Replace the recipe wholesale. The committed queue and stock are
    /// untouched; queued units were paid under the old recipe and still
    /// materialize.
    pub fn set_recipe(&mut self, recipe: Recipe) -> Result<(), ConfigError> {
        recipe.validate(&self.name)?;
        self.recipe = recipe;
        Ok(())
    }

    // -- Time ----------------------------------------------------------------

    /// Advance the factory's timer by `elapsed` seconds. The single
    /// time-advance path: realtime ticking, fast-forward, and offline
    /// catch-up all go through here, so they cannot diverge.
    ///
    /// Completed cycles are clamped by two independent ceilings: capacity
    /// headroom, and (for input-requiring recipes) the committed queue.
    /// The producing flag is recomputed from the post-update state with
    /// the same predicate as the live Producing -> Idle transition.
    pub fn apply_elapsed(&mut self, elapsed: Seconds) -> ElapsedOutcome {
        let mut outcome = ElapsedOutcome::default();
        if !self.is_producing || elapsed <= Seconds::ZERO {
            return outcome;
        }

        let result =
            compute_completed_cycles(elapsed, self.remaining_time, self.recipe.cycle_duration);
        outcome.cycles_elapsed = result.cycles;

        let headroom = self.capacity - self.current_stock;
        let amount = self.recipe.output_amount;

        if self.recipe.requires_input {
            // Queue units are committed in whole orders, so this division
            // is exact in every reachable state.
            let queue_cycles = u64::from(self.production_queue / amount);
            let usable = result.cycles.min(queue_cycles);
            let produced = (usable.saturating_mul(u64::from(amount)))
                .min(u64::from(headroom)) as u32;
            self.current_stock += produced;
            self.production_queue -= produced;
            outcome.produced = produced;
            outcome.queue_consumed = produced;
        } else {
            // Infinite source: a cycle completing with headroom smaller
            // than output_amount produces only the headroom, so the total
            // is min(cycles * amount, headroom) -- identical to ticking
            // the cycles one at a time.
            let produced = (result.cycles.saturating_mul(u64::from(amount)))
                .min(u64::from(headroom)) as u32;
            self.current_stock += produced;
            outcome.produced = produced;
        }

        if self.current_stock >= self.capacity {
            self.is_producing = false;
            self.remaining_time = Seconds::ZERO;
            outcome.stopped = Some(StopReason::CapacityReached);
        } else if self.recipe.requires_input && self.production_queue == 0 {
            // Queue emptied at a cycle boundary: the timer had just been
            // reset, so nothing accrued is worth preserving.
            self.is_producing = false;
            self.remaining_time = Seconds::ZERO;
            outcome.stopped = Some(StopReason::QueueEmpty);
        } else {
            self.remaining_time = result.new_remaining;
        }

        outcome
    }

    // -- Persistence ---------------------------------------------------------

    /// Overwrite runtime counters from a saved record. Stock is clamped
    /// to capacity and the queue to the remaining headroom so a
    /// hand-edited or stale save cannot break the state invariants.
    /// The producing flag is re-derived, not trusted.
    pub fn restore_state(
        &mut self,
        stock: u32,
        queue: u32,
        producing: bool,
        remaining_time: Seconds,
    ) {
        self.current_stock = stock.min(self.capacity);
        self.production_queue = if self.recipe.requires_input {
            queue.min(self.capacity - self.current_stock)
        } else {
            queue
        };
        self.remaining_time = remaining_time.max(Seconds::ZERO);
        self.is_producing = false;
        if producing {
            self.start_production();
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
