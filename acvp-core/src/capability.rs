//! Capability registry: which algorithms the module under test supports,
//! with what backend, parameters, and prerequisites.
//!
//! The registry is built during a registration phase that precedes any
//! document processing. The registration API takes
//! `Option<&mut ProcessingContext>` so the missing-context outcome of the
//! original handler contract stays expressible; once processing begins,
//! runs borrow the context immutably and the borrow checker keeps the
//! registry closed to mutation.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::backend::CryptoBackend;
use crate::error::{EngineError, EngineResult};

/// Algorithm identifiers known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    /// SP 800-135 SNMP password-to-key derivation.
    Kdf135Snmp,
    /// Secure hash primitive, referenced as a prerequisite.
    Sha,
}

impl Algorithm {
    /// Name this algorithm carries in vector-set documents.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Kdf135Snmp => "kdf135-snmp",
            Self::Sha => "sha",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Keys for numeric parameters configured on a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    /// Required password length for KDF135-SNMP test cases.
    PasswordLength,
}

/// Keys for fixed string configuration registered per algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixedField {
    /// SNMP engine identifier advertised for the module under test.
    EngineId,
}

/// Registered description of one algorithm the module under test supports.
///
/// Owned by the [`ProcessingContext`]; immutable once processing begins.
#[derive(Clone)]
pub struct AlgorithmCapability {
    enabled: bool,
    backend: Arc<dyn CryptoBackend>,
    parameters: BTreeMap<Parameter, u64>,
    fixed_fields: BTreeMap<FixedField, String>,
    prerequisites: Vec<(Algorithm, String)>,
}

impl AlgorithmCapability {
    fn new(backend: Arc<dyn CryptoBackend>) -> Self {
        Self {
            enabled: true,
            backend,
            parameters: BTreeMap::new(),
            fixed_fields: BTreeMap::new(),
            prerequisites: Vec::new(),
        }
    }

    /// Whether the algorithm is enabled for processing.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The backend invoked for every test case of this algorithm.
    #[must_use]
    pub fn backend(&self) -> &dyn CryptoBackend {
        self.backend.as_ref()
    }

    /// All configured numeric parameters.
    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<Parameter, u64> {
        &self.parameters
    }

    /// A single configured parameter, if set.
    #[must_use]
    pub fn parameter(&self, key: Parameter) -> Option<u64> {
        self.parameters.get(&key).copied()
    }

    /// A registered fixed field, if set.
    #[must_use]
    pub fn fixed_field(&self, key: FixedField) -> Option<&str> {
        self.fixed_fields.get(&key).map(String::as_str)
    }

    /// Declared prerequisite algorithms, in declaration order.
    #[must_use]
    pub fn prerequisites(&self) -> &[(Algorithm, String)] {
        &self.prerequisites
    }
}

impl fmt::Debug for AlgorithmCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmCapability")
            .field("enabled", &self.enabled)
            .field("parameters", &self.parameters)
            .field("fixed_fields", &self.fixed_fields)
            .field("prerequisites", &self.prerequisites)
            .finish_non_exhaustive()
    }
}

/// Caller-owned processing context: the capability registry consulted by
/// every KAT run.
#[derive(Debug, Default)]
pub struct ProcessingContext {
    capabilities: BTreeMap<Algorithm, AlgorithmCapability>,
}

impl ProcessingContext {
    /// Empty context with no algorithms enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The capability record for an algorithm, if one was ever enabled.
    #[must_use]
    pub fn capability(&self, algorithm: Algorithm) -> Option<&AlgorithmCapability> {
        self.capabilities.get(&algorithm)
    }

    /// Whether an algorithm is enabled for processing.
    #[must_use]
    pub fn is_enabled(&self, algorithm: Algorithm) -> bool {
        self.capabilities.get(&algorithm).is_some_and(AlgorithmCapability::is_enabled)
    }

    fn capability_mut(&mut self, algorithm: Algorithm) -> EngineResult<&mut AlgorithmCapability> {
        self.capabilities
            .get_mut(&algorithm)
            .ok_or_else(|| EngineError::UnsupportedOperation(format!("{algorithm} is not enabled")))
    }
}

/// Registers the backend for `algorithm` and marks it enabled.
///
/// Re-enabling replaces the backend but keeps previously configured
/// parameters, fields, and prerequisites (last write wins).
///
/// # Errors
/// Returns [`EngineError::NoContext`] if no context was supplied.
pub fn enable(
    ctx: Option<&mut ProcessingContext>,
    algorithm: Algorithm,
    backend: Arc<dyn CryptoBackend>,
) -> EngineResult<()> {
    let ctx = ctx.ok_or(EngineError::NoContext)?;
    match ctx.capabilities.entry(algorithm) {
        Entry::Occupied(mut entry) => {
            let capability = entry.get_mut();
            capability.backend = backend;
            capability.enabled = true;
        }
        Entry::Vacant(entry) => {
            entry.insert(AlgorithmCapability::new(backend));
        }
    }
    debug!(%algorithm, "capability enabled");
    Ok(())
}

/// Stores a numeric parameter on an enabled algorithm's capability.
///
/// # Errors
/// Returns [`EngineError::NoContext`] if no context was supplied, or
/// [`EngineError::UnsupportedOperation`] if the algorithm was never
/// enabled.
pub fn set_parameter(
    ctx: Option<&mut ProcessingContext>,
    algorithm: Algorithm,
    key: Parameter,
    value: u64,
) -> EngineResult<()> {
    let ctx = ctx.ok_or(EngineError::NoContext)?;
    ctx.capability_mut(algorithm)?.parameters.insert(key, value);
    debug!(%algorithm, ?key, value, "capability parameter set");
    Ok(())
}

/// Stores a fixed configuration string on an enabled algorithm's
/// capability, e.g. the SNMP engine identifier the module advertises.
///
/// # Errors
/// Returns [`EngineError::NoContext`] if no context was supplied, or
/// [`EngineError::UnsupportedOperation`] if the algorithm was never
/// enabled.
pub fn set_fixed_field(
    ctx: Option<&mut ProcessingContext>,
    algorithm: Algorithm,
    key: FixedField,
    value: &str,
) -> EngineResult<()> {
    let ctx = ctx.ok_or(EngineError::NoContext)?;
    ctx.capability_mut(algorithm)?.fixed_fields.insert(key, value.to_owned());
    debug!(%algorithm, ?key, value, "capability fixed field set");
    Ok(())
}

/// Declares a prerequisite of one algorithm on another primitive.
///
/// Prerequisites are metadata consumed by capability negotiation outside
/// this engine; processing never reads them. Redeclaring the same
/// prerequisite overwrites its value.
///
/// # Errors
/// Returns [`EngineError::NoContext`] if no context was supplied, or
/// [`EngineError::UnsupportedOperation`] if the algorithm was never
/// enabled.
pub fn declare_prerequisite(
    ctx: Option<&mut ProcessingContext>,
    algorithm: Algorithm,
    prerequisite: Algorithm,
    value: &str,
) -> EngineResult<()> {
    let ctx = ctx.ok_or(EngineError::NoContext)?;
    let capability = ctx.capability_mut(algorithm)?;
    match capability.prerequisites.iter().position(|(alg, _)| *alg == prerequisite) {
        Some(index) => {
            if let Some((_, existing)) = capability.prerequisites.get_mut(index) {
                *existing = value.to_owned();
            }
        }
        None => capability.prerequisites.push((prerequisite, value.to_owned())),
    }
    debug!(%algorithm, %prerequisite, value, "prerequisite declared");
    Ok(())
}
