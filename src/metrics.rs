//! Metric helpers for pipelined response delivery.
//!
//! Counters are recorded through the [`metrics`](https://docs.rs/metrics)
//! facade when the `metrics` feature is enabled; otherwise every helper is a
//! no-op so call sites need no feature gates.

/// Responses released to the transport in order.
pub const RESPONSES_RELEASED: &str = "pipelining_responses_released_total";
/// Connections aborted because the holding bound was reached.
pub const OVERFLOW_ABORTS: &str = "pipelining_overflow_aborts_total";
/// Completions rejected for breaking the sequencing contract.
pub const CONTRACT_VIOLATIONS: &str = "pipelining_contract_violations_total";

/// Record `count` responses released by one drain.
#[cfg(feature = "metrics")]
pub fn inc_released(count: usize) {
    metrics::counter!(RESPONSES_RELEASED).increment(u64::try_from(count).unwrap_or(u64::MAX));
}

#[cfg(not(feature = "metrics"))]
pub fn inc_released(_count: usize) {}

/// Record a connection aborted on overflow.
#[cfg(feature = "metrics")]
pub fn inc_overflow_aborts() { metrics::counter!(OVERFLOW_ABORTS).increment(1); }

#[cfg(not(feature = "metrics"))]
pub fn inc_overflow_aborts() {}

/// Record a rejected completion, labelled with the violation kind.
#[cfg(feature = "metrics")]
pub fn inc_contract_violations(kind: &'static str) {
    metrics::counter!(CONTRACT_VIOLATIONS, "kind" => kind).increment(1);
}

#[cfg(not(feature = "metrics"))]
pub fn inc_contract_violations(_kind: &'static str) {}
