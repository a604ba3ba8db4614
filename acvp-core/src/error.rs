//! Error taxonomy shared by every stage of the KAT engine.
//!
//! Every defect a run can surface is classified into exactly one of these
//! kinds, and every kind is terminal for the run that raised it: the engine
//! stops at the first classified error and never aggregates defects across
//! a document.

use thiserror::Error;

/// Discriminant-only view of [`EngineError`].
///
/// Callers that only care about the classification (test harnesses, session
/// reporting) compare kinds instead of matching on message payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Processing context absent or not initialized.
    NoContext,
    /// Operation requested for an algorithm that is not enabled.
    UnsupportedOperation,
    /// Document or group has no usable structure.
    MalformedInput,
    /// Required field structurally absent at its expected level.
    MissingField,
    /// Field present but out of its value domain.
    InvalidValue,
    /// The crypto backend under test reported failure.
    CryptoBackendFailure,
}

/// Classified outcome of a registry operation or a KAT processing run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No processing context was supplied, or it was never initialized.
    #[error("no processing context")]
    NoContext,

    /// The algorithm is not enabled in the capability registry.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The document (or one of its groups) is structurally unusable: wrong
    /// top-level shape, or a group missing its own identifier.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A required field is absent at its expected nesting level.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A required field is present but its value is out of domain.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The backend reported failure (or a fault was injected) on the given
    /// 0-based flattened invocation index.
    #[error("crypto module failure at invocation {invocation}")]
    CryptoBackendFailure {
        /// Flattened invocation index at which the run aborted.
        invocation: u64,
    },
}

impl EngineError {
    /// Classification of this error, independent of its payload.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoContext => ErrorKind::NoContext,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::InvalidValue(_) => ErrorKind::InvalidValue,
            Self::CryptoBackendFailure { .. } => ErrorKind::CryptoBackendFailure,
        }
    }
}

/// Convenience alias used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;
