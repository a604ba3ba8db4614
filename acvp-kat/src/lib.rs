#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # ACVP KAT Engine
//!
//! Capability-gated known-answer-test processing for ACVP vector sets.
//! Given an already-parsed vector-set document and a populated
//! [`acvp_core::ProcessingContext`], the engine validates the document's
//! structure against algorithm-specific rules, drives the registered
//! crypto backend through every test case in flattened order, and builds a
//! response document mirroring the input's group/case nesting.
//!
//! ## Modules
//!
//! - **schema**: classified JSON-walking helpers (the parse-or-fail boundary)
//! - **dispatch**: the generic per-case dispatch loop and run-stage tracking
//! - **response**: response-document assembly
//! - **kdf135_snmp**: the SP 800-135 SNMP KDF algorithm instance
//!
//! A run is synchronous and aborts on the first classified defect or
//! backend failure; an aborted run never surfaces partial results.

pub mod dispatch;
pub mod kdf135_snmp;
pub mod response;
pub mod schema;

pub use dispatch::{CaseResult, Invocation, RunOptions, RunStage};
pub use kdf135_snmp::{
    kat_handler, kat_handler_with, parse_vector_set, TestCase, TestGroup, VectorSetDocument,
};
pub use response::{ResponseCase, ResponseDocument, ResponseGroup};
