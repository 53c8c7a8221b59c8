//! Hardware clock conversion helpers.
//!
//! Devices timestamp transfers with a monotonic integer nanosecond counter
//! (see [`Device::hardware_time`](crate::device::Device::hardware_time)).
//! These helpers bridge that counter to floating-point seconds for reporting.
//!
//! # Precision
//!
//! A double mantissa holds 53 bits, so nanosecond counts above 2^53 ns
//! (about 104 days of continuous clock) are no longer exactly representable
//! and the conversion degrades to bounded relative error. This is a
//! deliberate design: the derived seconds value is for display and logging.
//! Callers that need long-duration precision must keep correlating against
//! the raw integer count, never the derived double.

/// Largest nanosecond count a double can represent exactly (2^53).
pub const MAX_EXACT_NS: i64 = 1 << 53;

/// Convert a hardware timestamp in nanoseconds to seconds.
///
/// Exact for `|ns| <= MAX_EXACT_NS` (to within double rounding of the
/// final multiply); beyond that, accurate to a relative error of about
/// 2^-52. See the module docs.
pub fn ns_to_secs(ns: i64) -> f64 {
    ns as f64 * 1.0e-9
}

/// Convert a seconds value to a hardware timestamp in nanoseconds.
///
/// The inverse of [`ns_to_secs`], used when scheduling timed transfers.
/// Fractional nanoseconds are truncated toward zero.
pub fn secs_to_ns(secs: f64) -> i64 {
    (secs * 1.0e9) as i64
}
