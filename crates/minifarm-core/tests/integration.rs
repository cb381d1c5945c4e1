//! End-to-end scenarios exercising the full orchestrator surface:
//! ordering, production, collection, offline catch-up, and save/restore.

use minifarm_core::factory::{OrderOutcome, RemoveOutcome};
use minifarm_core::fixed::seconds;
use minifarm_core::orchestrator::FactoryOrchestrator;
use minifarm_core::test_utils::*;

// ===========================================================================
// Production chain
// ===========================================================================

#[test]
fn wheat_to_bread_chain() {
    let (mut orch, field, mill, oven) = farm_chain();

    // The field runs unattended.
    assert_eq!(orch.add_order(field), OrderOutcome::Accepted);
    orch.advance(secs(12.0)); // 4 cycles of 3s fill the field (capacity 4)
    assert_eq!(orch.collect(field), 4);
    assert_eq!(orch.ledger().amount("Wheat"), 14);

    // Mill two orders' worth of wheat into flour.
    assert_eq!(orch.add_order(mill), OrderOutcome::Accepted);
    assert_eq!(orch.add_order(mill), OrderOutcome::Accepted);
    assert_eq!(orch.ledger().amount("Wheat"), 10);
    orch.advance(secs(10.0));
    assert_eq!(orch.collect(mill), 2);
    assert_eq!(orch.ledger().amount("Flour"), 2);

    // Bake one bread from the fresh flour.
    assert_eq!(orch.add_order(oven), OrderOutcome::Accepted);
    assert_eq!(orch.ledger().amount("Flour"), 0);
    assert_eq!(orch.ledger().amount("Water"), 9);
    orch.advance(secs(8.0));
    assert_eq!(orch.collect(oven), 1);
    assert_eq!(orch.ledger().amount("Bread"), 1);
}

#[test]
fn admission_is_all_or_nothing() {
    let (mut orch, _, _, oven) = farm_chain();

    // Flour is present but one short; water plentiful. Nothing consumed.
    orch.add_resource("Flour", 1);
    let water_before = orch.ledger().amount("Water");
    assert_eq!(orch.add_order(oven), OrderOutcome::MissingInput);
    assert_eq!(orch.ledger().amount("Flour"), 1);
    assert_eq!(orch.ledger().amount("Water"), water_before);
    assert_eq!(orch.factory(oven).unwrap().production_queue(), 0);
}

#[test]
fn add_then_remove_conserves_resources() {
    let (mut orch, _, mill, _) = farm_chain();
    let before = orch.resources();

    assert_eq!(orch.add_order(mill), OrderOutcome::Accepted);
    assert_eq!(orch.add_order(mill), OrderOutcome::Accepted);
    assert_eq!(orch.remove_order(mill), RemoveOutcome::Removed);
    assert_eq!(orch.remove_order(mill), RemoveOutcome::Removed);
    assert_eq!(orch.remove_order(mill), RemoveOutcome::NothingQueued);

    assert_eq!(orch.resources(), before);
    assert!(!orch.factory(mill).unwrap().is_producing());
}

#[test]
fn collect_is_idempotent() {
    let (mut orch, _, mill, _) = farm_chain();
    orch.add_order(mill);
    orch.advance(secs(5.0));

    assert_eq!(orch.collect(mill), 1);
    assert_eq!(orch.collect(mill), 0);
    assert_eq!(orch.ledger().amount("Flour"), 1);
}

#[test]
fn full_factory_refuses_orders_until_collected() {
    let mut orch = FactoryOrchestrator::new();
    let field = orch.create_factory(wheat_field()).unwrap();
    orch.add_order(field);
    orch.advance(secs(1000.0));

    assert_eq!(orch.factory(field).unwrap().current_stock(), 4);
    assert_eq!(orch.add_order(field), OrderOutcome::StockFull);

    orch.collect(field);
    // Auto-restarted with fresh headroom.
    assert!(orch.factory(field).unwrap().is_producing());
}

// ===========================================================================
// Offline catch-up equivalence
// ===========================================================================

#[test]
fn bulk_catchup_equals_incremental_ticking() {
    let build = || {
        let (mut orch, _, mill, _) = farm_chain();
        for _ in 0..4 {
            assert_eq!(orch.add_order(mill), OrderOutcome::Accepted);
        }
        orch.advance(secs(3.0)); // 2s left on the first cycle
        (orch, mill)
    };

    let (mut bulk, bulk_id) = build();
    let (mut tick, tick_id) = build();

    bulk.apply_offline_elapsed(bulk_id, 37.0);
    for _ in 0..37 {
        tick.advance(secs(1.0));
    }

    let a = bulk.factory(bulk_id).unwrap();
    let b = tick.factory(tick_id).unwrap();
    assert_eq!(a.current_stock(), b.current_stock());
    assert_eq!(a.production_queue(), b.production_queue());
    assert_eq!(a.remaining_time(), b.remaining_time());
    assert_eq!(a.is_producing(), b.is_producing());

    // 37s with 2s remaining on a 5s cycle is 8 timer cycles, but only
    // 4 orders were ever paid for.
    assert_eq!(a.current_stock(), 4);
    assert_eq!(a.production_queue(), 0);
    assert!(!a.is_producing());
}

#[test]
fn catchup_runtime_is_independent_of_gap_length() {
    // A three-month gap resolves instantly and lands on the clamped
    // state; this test would hang if catch-up looped per cycle.
    let mut orch = FactoryOrchestrator::new();
    let field = orch.create_factory(wheat_field()).unwrap();
    orch.add_order(field);

    let outcome = orch
        .apply_offline_elapsed(field, 90.0 * 24.0 * 3600.0)
        .unwrap();
    assert_eq!(outcome.cycles_elapsed, 2_592_000);
    assert_eq!(outcome.produced, 4);
    assert_eq!(orch.factory(field).unwrap().current_stock(), 4);
}

// ===========================================================================
// Save / restore
// ===========================================================================

#[test]
fn save_restore_round_trip_with_offline_gap() {
    let (mut orch, _, mill, _) = farm_chain();
    for _ in 0..4 {
        orch.add_order(mill);
    }
    orch.advance(secs(3.0));
    let snapshot = orch.capture_snapshot(1_000_000);
    let bytes = snapshot.to_bytes().unwrap();

    // Meanwhile the original keeps ticking for 37s.
    orch.advance(secs(37.0));

    // A fresh session loads the save 37s later.
    let (mut fresh, _, fresh_mill, _) = farm_chain();
    let decoded = minifarm_core::snapshot::GameSnapshot::from_bytes(&bytes).unwrap();
    fresh.restore_snapshot(&decoded, 1_037_000);

    let live = orch.factory(mill).unwrap();
    let restored = fresh.factory(fresh_mill).unwrap();
    assert_eq!(restored.current_stock(), live.current_stock());
    assert_eq!(restored.production_queue(), live.production_queue());
    assert_eq!(restored.remaining_time(), live.remaining_time());
    assert_eq!(fresh.ledger().amount("Wheat"), orch.ledger().amount("Wheat"));
}

#[test]
fn subsecond_gap_restores_without_catchup() {
    let (mut orch, _, mill, _) = farm_chain();
    orch.add_order(mill);
    orch.advance(secs(2.0));
    let snapshot = orch.capture_snapshot(1_000_000);

    let (mut fresh, _, fresh_mill, _) = farm_chain();
    fresh.restore_snapshot(&snapshot, 1_000_400);

    let restored = fresh.factory(fresh_mill).unwrap();
    assert_eq!(restored.remaining_time(), secs(3.0));
    assert_eq!(restored.current_stock(), 0);
    assert!(restored.is_producing());
}

#[test]
fn restored_idle_factory_stays_idle_through_gap() {
    let (orch, _, mill, _) = farm_chain();
    let snapshot = orch.capture_snapshot(1_000_000);
    assert!(!orch.factory(mill).unwrap().is_producing());

    let (mut fresh, _, fresh_mill, _) = farm_chain();
    // A week passes; a factory with nothing queued produces nothing.
    fresh.restore_snapshot(&snapshot, 1_000_000 + 7 * 24 * 3600 * 1000);
    assert_eq!(fresh.factory(fresh_mill).unwrap().current_stock(), 0);
}
