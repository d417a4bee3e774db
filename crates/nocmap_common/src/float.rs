//! Epsilon-tolerant floating point comparisons.
//!
//! Cost values are sums of many small products, so two evaluations of the
//! same placement can differ in the last bits depending on summation order.
//! Every accept/reject decision goes through these helpers, which scale
//! `f64::EPSILON` by the larger magnitude of the two operands.

/// Returns `true` if `a` and `b` are equal within a relative epsilon.
pub fn approximately_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()) * f64::EPSILON
}

/// Returns `true` if `a` is greater than `b` by more than a relative epsilon.
pub fn definitely_greater(a: f64, b: f64) -> bool {
    (a - b) > a.abs().max(b.abs()) * f64::EPSILON
}

/// Returns `true` if `a` is less than `b` by more than a relative epsilon.
pub fn definitely_less(a: f64, b: f64) -> bool {
    (b - a) > a.abs().max(b.abs()) * f64::EPSILON
}
