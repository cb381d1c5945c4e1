use fixed::types::I32F32;

/// Q32.32 fixed-point seconds: 32 integer bits, 32 fractional bits.
///
/// All simulation time (cycle durations, remaining times, elapsed
/// intervals) is expressed in `Seconds`. Fixed-point keeps the offline
/// catch-up arithmetic exactly reproducible: `elapsed % cycle_duration`
/// has one answer, and the "remainder equals a full cycle" normalization
/// is an exact comparison rather than an epsilon test.
pub type Seconds = I32F32;

/// Convert an f64 to Seconds. Use only for initialization and config
/// parsing, never in the simulation loop.
#[inline]
pub fn seconds(v: f64) -> Seconds {
    Seconds::from_num(v)
}

/// Convert Seconds to f64. Use only for display, never in the sim loop.
#[inline]
pub fn seconds_to_f64(v: Seconds) -> f64 {
    v.to_num::<f64>()
}

/// Sanitize wall-clock elapsed time arriving from outside the simulation.
///
/// NaN and negative values (clock skew, corrupt save timestamps) are
/// clamped to zero so they never reach the catch-up arithmetic. Values
/// beyond the Q32.32 range saturate at the maximum representable span
/// (about 68 years), which still floors to the correct cycle count for
/// any realistic recipe.
#[inline]
pub fn seconds_from_wall_clock(v: f64) -> Seconds {
    if v.is_nan() || v <= 0.0 {
        return Seconds::ZERO;
    }
    Seconds::saturating_from_num(v)
}
