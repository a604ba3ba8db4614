#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # ACVP Core
//!
//! Core building blocks for a client-side ACVP conformance-testing engine:
//! the capability registry describing which algorithms a module under test
//! supports, the pluggable crypto-backend contract, and the shared error
//! taxonomy every processing stage classifies its defects into.
//!
//! ## Modules
//!
//! - **capability**: algorithm capability records and the registration API
//! - **backend**: the `CryptoBackend` contract, fault injection, invocation counting
//! - **error**: the canonical outcome taxonomy
//!
//! The registry is populated once, before any vector set is processed, and
//! is read-only for the lifetime of every run. Runs borrow the
//! [`ProcessingContext`] immutably, so concurrent runs over one registry
//! need no locking.

pub mod backend;
pub mod capability;
pub mod error;

pub use backend::{BackendFailure, BackendInput, CryptoBackend, FaultPolicy, InvocationCounter};
pub use capability::{
    declare_prerequisite, enable, set_fixed_field, set_parameter, Algorithm, AlgorithmCapability,
    FixedField, Parameter, ProcessingContext,
};
pub use error::{EngineError, EngineResult, ErrorKind};
