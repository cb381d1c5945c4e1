//! Offline catch-up calculator.
//!
//! Pure arithmetic that answers: given `elapsed` seconds during which a
//! factory's timer was not ticking, how many cycles completed and how far
//! into the next cycle is it now? Runs in O(1) regardless of the gap
//! length -- a multi-day offline gap must never be re-simulated second by
//! second.
//!
//! The incremental path ([`crate::factory::Factory::apply_elapsed`]) uses
//! this same function for every time slice, so bulk catch-up and
//! per-frame ticking are the same computation by construction.

use crate::fixed::Seconds;

/// Result of a catch-up computation. Cycle clamping (capacity headroom,
/// committed queue) is the factory's job; this is timer math only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchupResult {
    /// Full cycles the timer completed during the interval.
    pub cycles: u64,
    /// Time left until the next completion. Zero either means the
    /// interval landed exactly on a cycle boundary or that the factory is
    /// in a fresh state; both are treated as "a full cycle ahead" on the
    /// next advance.
    pub new_remaining: Seconds,
}

/// Floor of `a / b` for non-negative fixed-point values, computed on raw
/// bits so the quotient cannot overflow the fixed-point integer range.
fn floor_div(a: Seconds, b: Seconds) -> u64 {
    debug_assert!(a >= Seconds::ZERO && b > Seconds::ZERO);
    // Q32.32 bit patterns of non-negative values divide like integers.
    (a.to_bits() as u64) / (b.to_bits() as u64)
}

/// Compute completed cycles and the new remaining time for an elapsed
/// interval.
///
/// * `remaining_time > 0` -- the factory was mid-cycle. The first
///   completion lands after `remaining_time`, every later one after a
///   further `cycle_duration`.
/// * `remaining_time == 0` -- fresh or boundary state; the first
///   completion is a full cycle away.
///
/// The returned `new_remaining` is normalized to zero when the interval
/// divides exactly (never returns `cycle_duration` itself). Exact under
/// fixed-point; no epsilon involved.
///
/// Guards: non-positive `cycle_duration` or `elapsed` yields zero cycles
/// and an unchanged remainder. Negative/NaN wall-clock input is already
/// clamped by [`crate::fixed::seconds_from_wall_clock`].
pub fn compute_completed_cycles(
    elapsed: Seconds,
    remaining_time: Seconds,
    cycle_duration: Seconds,
) -> CatchupResult {
    let remaining = remaining_time.max(Seconds::ZERO);
    if cycle_duration <= Seconds::ZERO || elapsed <= Seconds::ZERO {
        return CatchupResult {
            cycles: 0,
            new_remaining: remaining,
        };
    }

    let (head_cycles, rest) = if remaining > Seconds::ZERO {
        if elapsed < remaining {
            return CatchupResult {
                cycles: 0,
                new_remaining: remaining - elapsed,
            };
        }
        // One completion at t = remaining, then full cycles from the rest.
        (1u64, elapsed - remaining)
    } else {
        (0u64, elapsed)
    };

    let cycles = head_cycles + floor_div(rest, cycle_duration);
    let partial = rest % cycle_duration;
    let new_remaining = if partial == Seconds::ZERO {
        Seconds::ZERO
    } else {
        cycle_duration - partial
    };

    CatchupResult {
        cycles,
        new_remaining,
    }
}
