//! The pluggable crypto-backend contract and per-run fault injection.
//!
//! The engine never performs cryptographic mathematics itself. Each enabled
//! algorithm carries an owned [`CryptoBackend`], injected at registration
//! time, that the dispatch loop invokes synchronously for every test case.
//! Backend latency is opaque to the engine: no timeout, no retry, and any
//! failure is terminal for the run.
//!
//! Fault injection replaces the original global invocation counters with a
//! per-run [`FaultPolicy`] plus a run-owned [`InvocationCounter`], so
//! concurrent runs cannot interfere with each other.

use std::collections::BTreeMap;
use std::fmt;

use crate::capability::Parameter;

/// Borrowed view of the data handed to the backend for one invocation.
///
/// Combines the per-case secret material with the group-level engine
/// identifier and the capability's configured parameters.
#[derive(Debug)]
pub struct BackendInput<'a> {
    /// Password from the test case.
    pub password: &'a str,
    /// Engine identifier from the enclosing test group.
    pub engine_id: &'a str,
    /// Parameters configured on the capability at registration time.
    pub parameters: &'a BTreeMap<Parameter, u64>,
}

/// Opaque failure signal from a backend.
///
/// The engine does not inspect the payload; any failure maps to
/// [`crate::error::EngineError::CryptoBackendFailure`].
#[derive(Debug, Default)]
pub struct BackendFailure {
    reason: Option<String>,
}

impl BackendFailure {
    /// Failure with no stated reason.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failure carrying a human-readable reason for logs.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self { reason: Some(reason.into()) }
    }
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "backend failure: {reason}"),
            None => write!(f, "backend failure"),
        }
    }
}

/// Contract implemented by the module under test's cryptographic backend.
///
/// Implementations must be thread-safe: the surrounding harness may drive
/// several runs concurrently against one registry.
pub trait CryptoBackend: Send + Sync {
    /// Performs the cryptographic computation for one test case, returning
    /// the derived output bytes.
    ///
    /// # Errors
    /// Returns [`BackendFailure`] if the module under test cannot produce
    /// an output; the engine aborts the run on the first such failure.
    fn compute(&self, input: &BackendInput<'_>) -> Result<Vec<u8>, BackendFailure>;
}

impl<F> CryptoBackend for F
where
    F: Fn(&BackendInput<'_>) -> Result<Vec<u8>, BackendFailure> + Send + Sync,
{
    fn compute(&self, input: &BackendInput<'_>) -> Result<Vec<u8>, BackendFailure> {
        self(input)
    }
}

/// Per-run fault-injection strategy.
///
/// Used by conformance harnesses to simulate a defective module at an exact
/// point in the flattened invocation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Never inject a fault; only genuine backend failures abort the run.
    #[default]
    Never,
    /// Abort with a backend failure when the 0-based flattened invocation
    /// index reaches this value.
    FailAt(u64),
}

impl FaultPolicy {
    /// Whether the policy fires for the given invocation index.
    #[must_use]
    pub fn fires_at(self, invocation: u64) -> bool {
        matches!(self, Self::FailAt(k) if k == invocation)
    }
}

/// Run-scoped count of backend invocation attempts.
///
/// Advances on every attempt, including ones that fail, before the
/// backend's own outcome is examined. Each run owns its counter; nothing is
/// shared across runs.
#[derive(Debug, Default)]
pub struct InvocationCounter(u64);

impl InvocationCounter {
    /// Fresh counter for a new run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the 0-based index of the attempt being made and advances.
    pub fn next_attempt(&mut self) -> u64 {
        let index = self.0;
        self.0 += 1;
        index
    }

    /// Number of attempts made so far.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_advances_per_attempt() {
        let mut counter = InvocationCounter::new();
        assert_eq!(counter.next_attempt(), 0);
        assert_eq!(counter.next_attempt(), 1);
        assert_eq!(counter.attempts(), 2);
    }

    #[test]
    fn fault_policy_fires_only_at_configured_index() {
        let policy = FaultPolicy::FailAt(3);
        assert!(!policy.fires_at(0));
        assert!(!policy.fires_at(2));
        assert!(policy.fires_at(3));
        assert!(!policy.fires_at(4));
        assert!(!FaultPolicy::Never.fires_at(0));
    }

    #[test]
    fn backend_failure_display() {
        assert_eq!(BackendFailure::new().to_string(), "backend failure");
        assert_eq!(
            BackendFailure::with_reason("self-test refused").to_string(),
            "backend failure: self-test refused"
        );
    }
}
