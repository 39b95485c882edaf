/// Smallest reliability used before taking a logarithm.
pub const RELIABILITY_FLOOR: f64 = 1e-12;

/// Probability that no transient fault arrives during `duration` seconds at fault rate `lambda`.
///
/// Exponential model `exp(-lambda * duration)`, always in `(0, 1]` for a
/// non-negative duration. Callers must never pass a negative duration.
pub fn reliability(lambda: f64, duration: f64) -> f64 {
    debug_assert!(duration >= 0.0, "reliability requested for negative duration {}", duration);
    (-lambda * duration.max(0.0)).exp()
}

/// Clamps a reliability to [`RELIABILITY_FLOOR`] so its logarithm stays finite.
pub fn floor_reliability(reliability: f64) -> f64 {
    reliability.max(RELIABILITY_FLOOR)
}

/// `ln` of a reliability, computed on the floored value.
pub fn log_reliability(reliability: f64) -> f64 {
    floor_reliability(reliability).ln()
}
