//! Property-based tests for the production simulation.
//!
//! Uses proptest to generate random timer states, elapsed intervals, and
//! operation sequences, then verify the core invariants hold: bulk
//! catch-up equals incremental ticking, stock never exceeds capacity,
//! and admission/removal conserve resources exactly.

use minifarm_core::catchup::compute_completed_cycles;
use minifarm_core::factory::{Factory, OrderOutcome};
use minifarm_core::fixed::Seconds;
use minifarm_core::ledger::ResourceLedger;
use minifarm_core::recipe::{FactoryConfig, Recipe, ResourceRequirement};
use minifarm_core::test_utils::secs;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Durations in quarter-second steps: exactly representable in Q32.32,
/// so the reference loop below is exact too.
fn arb_duration(max_quarters: u32) -> impl Strategy<Value = Seconds> {
    (1..=max_quarters).prop_map(|q| secs(f64::from(q) * 0.25))
}

fn arb_elapsed(max_quarters: u32) -> impl Strategy<Value = Seconds> {
    (0..=max_quarters).prop_map(|q| secs(f64::from(q) * 0.25))
}

fn mill_config(capacity: u32, output_amount: u32, cycle: Seconds) -> FactoryConfig {
    FactoryConfig {
        name: "Mill".to_string(),
        capacity,
        recipe: Recipe {
            output_resource: "Flour".to_string(),
            output_amount,
            cycle_duration: cycle,
            requires_input: true,
            requirements: vec![ResourceRequirement {
                resource: "Wheat".to_string(),
                amount: 2,
            }],
        },
    }
}

/// Reference implementation: subtract the elapsed time cycle by cycle.
/// O(cycles), only usable for small intervals, but obviously correct.
fn reference_cycles(elapsed: Seconds, remaining: Seconds, cycle: Seconds) -> (u64, Seconds) {
    let mut left = elapsed;
    let mut rem = if remaining > Seconds::ZERO {
        remaining
    } else {
        cycle
    };
    let mut cycles = 0u64;
    while left >= rem {
        left -= rem;
        rem = cycle;
        cycles += 1;
    }
    let new_remaining = if left == Seconds::ZERO {
        // Landed exactly on a boundary (or never moved off one).
        if cycles > 0 || remaining <= Seconds::ZERO {
            Seconds::ZERO
        } else {
            remaining
        }
    } else {
        rem - left
    };
    (cycles, new_remaining)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The O(1) catch-up formula agrees with the cycle-by-cycle
    /// reference loop on every reachable timer state.
    #[test]
    fn catchup_matches_reference_loop(
        elapsed in arb_elapsed(2000),   // up to 500s
        cycle in arb_duration(80),      // up to 20s
        remaining_q in 0u32..=80,
    ) {
        // Reachable states have remaining <= cycle.
        let remaining = secs(f64::from(remaining_q) * 0.25).min(cycle);

        let result = compute_completed_cycles(elapsed, remaining, cycle);
        let (ref_cycles, ref_remaining) = reference_cycles(elapsed, remaining, cycle);

        prop_assert_eq!(result.cycles, ref_cycles);
        prop_assert_eq!(result.new_remaining, ref_remaining);
        prop_assert!(result.new_remaining < cycle || result.new_remaining == Seconds::ZERO
            || elapsed == Seconds::ZERO);
    }

    /// Applying one interval in a single call lands on exactly the same
    /// state as applying it in arbitrary smaller pieces.
    #[test]
    fn bulk_elapse_equals_any_split(
        capacity in 1u32..=20,
        cycle in arb_duration(40),
        orders in 1usize..=10,
        splits in proptest::collection::vec(1u32..=200, 1..=20),
    ) {
        let config = mill_config(capacity, 1, cycle);
        let mut bulk = Factory::new(config.clone()).unwrap();
        let mut split = Factory::new(config).unwrap();
        let mut ledger_a = ResourceLedger::new();
        let mut ledger_b = ResourceLedger::new();
        ledger_a.add("Wheat", 1000);
        ledger_b.add("Wheat", 1000);

        for _ in 0..orders {
            let a = bulk.add_order(&mut ledger_a);
            let b = split.add_order(&mut ledger_b);
            prop_assert_eq!(a, b);
        }

        let total: u32 = splits.iter().sum();
        bulk.apply_elapsed(secs(f64::from(total) * 0.25));
        for q in &splits {
            split.apply_elapsed(secs(f64::from(*q) * 0.25));
        }

        prop_assert_eq!(bulk.current_stock(), split.current_stock());
        prop_assert_eq!(bulk.production_queue(), split.production_queue());
        prop_assert_eq!(bulk.remaining_time(), split.remaining_time());
        prop_assert_eq!(bulk.is_producing(), split.is_producing());
        prop_assert_eq!(ledger_a.amount("Wheat"), ledger_b.amount("Wheat"));
    }

    /// Stock plus committed queue never exceed capacity for an
    /// input-requiring factory, no matter the operation sequence.
    #[test]
    fn capacity_invariant_under_random_ops(
        capacity in 1u32..=10,
        cycle in arb_duration(40),
        ops in proptest::collection::vec(0u8..=3, 1..=60),
    ) {
        let mut factory = Factory::new(mill_config(capacity, 1, cycle)).unwrap();
        let mut ledger = ResourceLedger::new();
        ledger.add("Wheat", 10_000);

        for op in ops {
            match op {
                0 => { let _ = factory.add_order(&mut ledger); }
                1 => { let _ = factory.remove_order(&mut ledger); }
                2 => { factory.apply_elapsed(cycle); }
                _ => { factory.collect(&mut ledger); }
            }
            prop_assert!(factory.current_stock() <= capacity);
            prop_assert!(
                factory.current_stock() + factory.production_queue() <= capacity
            );
        }
    }

    /// Wheat is conserved: every unit is either still in the ledger,
    /// committed to a queue, or embodied in produced flour.
    #[test]
    fn resource_conservation_under_random_ops(
        capacity in 1u32..=10,
        cycle in arb_duration(40),
        initial_wheat in 0u32..=100,
        ops in proptest::collection::vec(0u8..=3, 1..=60),
    ) {
        let mut factory = Factory::new(mill_config(capacity, 1, cycle)).unwrap();
        let mut ledger = ResourceLedger::new();
        ledger.add("Wheat", initial_wheat);

        for op in ops {
            match op {
                0 => { let _ = factory.add_order(&mut ledger); }
                1 => { let _ = factory.remove_order(&mut ledger); }
                2 => { factory.apply_elapsed(cycle); }
                _ => { factory.collect(&mut ledger); }
            }
            let embodied =
                2 * (factory.production_queue() + factory.current_stock() + ledger.amount("Flour"));
            prop_assert_eq!(ledger.amount("Wheat") + embodied, initial_wheat);
        }
    }

    /// A rejected order is a strict no-op on factory and ledger.
    #[test]
    fn rejected_orders_change_nothing(
        capacity in 1u32..=5,
        wheat in 0u32..=1,
    ) {
        let mut factory = Factory::new(mill_config(capacity, 1, secs(5.0))).unwrap();
        let mut ledger = ResourceLedger::new();
        ledger.add("Wheat", wheat);

        let before_queue = factory.production_queue();
        let outcome = factory.add_order(&mut ledger);
        prop_assert_eq!(outcome, OrderOutcome::MissingInput);
        prop_assert_eq!(factory.production_queue(), before_queue);
        prop_assert_eq!(ledger.amount("Wheat"), wheat);
        prop_assert!(!factory.is_producing());
    }

    /// Snapshot round-trip through bytes preserves every record bit-for-bit.
    #[test]
    fn snapshot_round_trip_is_lossless(
        wheat in 0u32..=500,
        orders in 0usize..=2,
        advance_q in 0u32..=100,
    ) {
        use minifarm_core::orchestrator::FactoryOrchestrator;
        use minifarm_core::snapshot::GameSnapshot;
        use minifarm_core::test_utils::flour_mill;

        let mut orch = FactoryOrchestrator::new();
        orch.add_resource("Wheat", wheat);
        let id = orch.create_factory(flour_mill()).unwrap();
        for _ in 0..orders {
            let _ = orch.add_order(id);
        }
        orch.advance(secs(f64::from(advance_q) * 0.25));

        let snapshot = orch.capture_snapshot(123_456);
        let bytes = snapshot.to_bytes().unwrap();
        let decoded = GameSnapshot::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.factories, snapshot.factories);
        prop_assert_eq!(decoded.resources, snapshot.resources);
    }
}
