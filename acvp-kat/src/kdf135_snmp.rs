//! SP 800-135 SNMP KDF algorithm instance.
//!
//! Hosts the one concrete algorithm family behind the generic dispatch
//! shape: the typed vector-set document, the single validating parse pass,
//! and the KAT handler entry point that wires preconditions, validation,
//! dispatch, and response building together.

use acvp_core::capability::{Algorithm, AlgorithmCapability, Parameter, ProcessingContext};
use acvp_core::error::{EngineError, EngineResult};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dispatch::{run_cases, Invocation, RunOptions, RunStage, RunTracker};
use crate::response::ResponseDocument;
use crate::schema::{as_object, required_array, required_str, required_u64, Absence};

/// Validated vector-set document for one run.
///
/// Transient: owned by the run that parsed it, discarded once the response
/// is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorSetDocument {
    /// Declared algorithm name.
    pub algorithm: String,
    /// Test groups in document order.
    pub groups: Vec<TestGroup>,
}

/// One validated test group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    /// Group identifier (`tgId`).
    pub group_id: u64,
    /// SNMP engine identifier shared by the group's cases.
    pub engine_id: String,
    /// Test cases in document order.
    pub cases: Vec<TestCase>,
}

/// One validated test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Case identifier (`tcId`).
    pub case_id: u64,
    /// Password to derive from.
    pub password: String,
    /// Declared password length, already checked for consistency.
    pub password_length: u64,
}

impl VectorSetDocument {
    /// Lowers the document into flattened invocation order: group order,
    /// then case order, across group boundaries.
    fn invocations(&self) -> impl Iterator<Item = Invocation<'_>> {
        self.groups.iter().flat_map(|group| {
            group.cases.iter().map(move |case| Invocation {
                group_id: group.group_id,
                case_id: case.case_id,
                password: &case.password,
                engine_id: &group.engine_id,
            })
        })
    }

    /// Total number of test cases across all groups.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.groups.iter().map(|group| group.cases.len()).sum()
    }
}

/// Single validating parse pass: raw tree in, typed document or classified
/// error out.
///
/// Validation is top-down and short-circuits on the first defect anywhere
/// in the document; a defect in a later group still rejects the whole
/// document, and no partial document ever reaches dispatch.
///
/// # Errors
/// Classifies defects per the engine taxonomy: unusable top-level shape or
/// a group without `tgId` as [`EngineError::MalformedInput`]; an absent
/// groups list, engine id, cases list, case id, or password as
/// [`EngineError::MissingField`]; a password-length inconsistency or an
/// algorithm-name mismatch as [`EngineError::InvalidValue`].
pub fn parse_vector_set(
    root: &Value,
    capability: &AlgorithmCapability,
) -> EngineResult<VectorSetDocument> {
    let obj = as_object(root, "vector set")?;
    let raw_groups = required_array(obj, "testGroups")?;
    let configured_length = capability.parameter(Parameter::PasswordLength);

    let mut groups = Vec::with_capacity(raw_groups.len());
    for raw_group in raw_groups {
        let group = as_object(raw_group, "test group")?;
        // tgId is the correlation key for the whole group; without it the
        // group cannot appear in any response, so absence is structural.
        let group_id = required_u64(group, "tgId", Absence::Structural)?;
        let engine_id = required_str(group, "engineId")?.to_owned();
        let raw_cases = required_array(group, "tests")?;

        let mut cases = Vec::with_capacity(raw_cases.len());
        for raw_case in raw_cases {
            let case = as_object(raw_case, "test case")?;
            let case_id = required_u64(case, "tcId", Absence::Field)?;
            let password = required_str(case, "password")?.to_owned();
            let password_length = check_password_length(case, &password, configured_length)?;
            cases.push(TestCase { case_id, password, password_length });
        }
        groups.push(TestGroup { group_id, engine_id, cases });
    }

    let algorithm = check_algorithm_name(obj)?;
    debug!(groups = groups.len(), "vector set validated");
    Ok(VectorSetDocument { algorithm, groups })
}

/// `passwordLength` is a value-domain check, not a structural one: literal
/// absence counts as an invalid value, and a present value must match both
/// the actual password length and the capability's configured length.
fn check_password_length(
    case: &Map<String, Value>,
    password: &str,
    configured: Option<u64>,
) -> EngineResult<u64> {
    let declared = case
        .get("passwordLength")
        .and_then(Value::as_u64)
        .ok_or_else(|| EngineError::InvalidValue("passwordLength absent or not an integer".to_owned()))?;
    if declared != password.len() as u64 {
        return Err(EngineError::InvalidValue(format!(
            "passwordLength {declared} does not match password of length {}",
            password.len()
        )));
    }
    if let Some(required) = configured {
        if declared != required {
            return Err(EngineError::InvalidValue(format!(
                "passwordLength {declared} does not match configured length {required}"
            )));
        }
    }
    Ok(declared)
}

fn check_algorithm_name(obj: &Map<String, Value>) -> EngineResult<String> {
    let expected = Algorithm::Kdf135Snmp.wire_name();
    let declared = obj
        .get("algorithm")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::MalformedInput("vector set has no algorithm name".to_owned()))?;
    if declared != expected {
        return Err(EngineError::InvalidValue(format!(
            "algorithm '{declared}' does not match enabled capability '{expected}'"
        )));
    }
    Ok(declared.to_owned())
}

/// KAT handler entry point with default run options.
///
/// # Errors
/// See [`kat_handler_with`].
pub fn kat_handler(
    ctx: Option<&ProcessingContext>,
    document: Option<&Value>,
) -> EngineResult<ResponseDocument> {
    kat_handler_with(ctx, document, RunOptions::default())
}

/// KAT handler entry point.
///
/// Precondition checks run before the schema validator and take precedence
/// over all document-content errors: a missing context, then a missing
/// document, then a disabled capability. A run that aborts at any stage
/// produces no response document, only its classified error.
///
/// # Errors
/// Returns [`EngineError::NoContext`] without a context,
/// [`EngineError::MalformedInput`] without a document,
/// [`EngineError::UnsupportedOperation`] if KDF135-SNMP is not enabled,
/// any schema-validation classification, or
/// [`EngineError::CryptoBackendFailure`] from dispatch.
pub fn kat_handler_with(
    ctx: Option<&ProcessingContext>,
    document: Option<&Value>,
    options: RunOptions,
) -> EngineResult<ResponseDocument> {
    let mut run = RunTracker::new(Algorithm::Kdf135Snmp);
    match execute(ctx, document, options, &mut run) {
        Ok(response) => {
            run.advance(RunStage::Done);
            Ok(response)
        }
        Err(err) => {
            run.fail(err.kind());
            Err(err)
        }
    }
}

fn execute(
    ctx: Option<&ProcessingContext>,
    document: Option<&Value>,
    options: RunOptions,
    run: &mut RunTracker,
) -> EngineResult<ResponseDocument> {
    let ctx = ctx.ok_or(EngineError::NoContext)?;
    let document =
        document.ok_or_else(|| EngineError::MalformedInput("no document supplied".to_owned()))?;
    let capability = ctx
        .capability(Algorithm::Kdf135Snmp)
        .filter(|capability| capability.is_enabled())
        .ok_or_else(|| {
            EngineError::UnsupportedOperation(format!(
                "{} is not enabled",
                Algorithm::Kdf135Snmp
            ))
        })?;

    run.advance(RunStage::ValidatingDocument);
    let vector_set = parse_vector_set(document, capability)?;

    run.advance(RunStage::Dispatching);
    let results = run_cases(vector_set.invocations(), capability, options)?;

    run.advance(RunStage::BuildingResponse);
    Ok(ResponseDocument::assemble(vector_set.algorithm, results))
}
