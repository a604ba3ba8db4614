//! Error taxonomy tests: kind classification and display formatting.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use acvp_core::error::{EngineError, ErrorKind};

fn all_variants() -> Vec<EngineError> {
    vec![
        EngineError::NoContext,
        EngineError::UnsupportedOperation("kdf135-snmp is not enabled".to_owned()),
        EngineError::MalformedInput("vector set is not an object".to_owned()),
        EngineError::MissingField("password"),
        EngineError::InvalidValue("passwordLength 63 does not match password of length 64".to_owned()),
        EngineError::CryptoBackendFailure { invocation: 9 },
    ]
}

#[test]
fn every_variant_maps_to_its_kind() {
    let kinds: Vec<ErrorKind> = all_variants().iter().map(EngineError::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::NoContext,
            ErrorKind::UnsupportedOperation,
            ErrorKind::MalformedInput,
            ErrorKind::MissingField,
            ErrorKind::InvalidValue,
            ErrorKind::CryptoBackendFailure,
        ]
    );
}

#[test]
fn display_carries_the_classification_and_payload() {
    assert_eq!(EngineError::NoContext.to_string(), "no processing context");
    assert_eq!(
        EngineError::MissingField("engineId").to_string(),
        "missing required field 'engineId'"
    );
    assert_eq!(
        EngineError::CryptoBackendFailure { invocation: 0 }.to_string(),
        "crypto module failure at invocation 0"
    );
    assert!(EngineError::UnsupportedOperation("x".to_owned()).to_string().starts_with("unsupported"));
}

#[test]
fn kinds_are_comparable_and_hashable() {
    use std::collections::HashSet;
    let kinds: HashSet<ErrorKind> = all_variants().iter().map(EngineError::kind).collect();
    assert_eq!(kinds.len(), 6);
}
