//! The generic per-case dispatch loop and run-stage tracking.
//!
//! Dispatch consumes only flattened [`Invocation`]s, so each algorithm
//! family lowers its validated document into the same shape and the loop,
//! counter, and fault handling are written once. Invocation order is group
//! order then case order, preserved across group boundaries so a fault can
//! be injected at an exact global index.

use acvp_core::backend::{BackendInput, FaultPolicy, InvocationCounter};
use acvp_core::capability::{Algorithm, AlgorithmCapability};
use acvp_core::error::{EngineError, EngineResult, ErrorKind};
use tracing::{debug, trace, warn};

/// Per-run options supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Fault-injection strategy for this run.
    pub fault: FaultPolicy,
}

/// Stage a run is in; `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Run created, nothing examined yet.
    Idle,
    /// Schema validation of the vector-set document.
    ValidatingDocument,
    /// Driving the backend through the accepted cases.
    Dispatching,
    /// Assembling the response document.
    BuildingResponse,
    /// Run completed and a response was produced.
    Done,
    /// Run aborted with the classified error kind.
    Failed(ErrorKind),
}

/// Tracks one run's progress through the stage machine, tracing every
/// transition.
#[derive(Debug)]
pub(crate) struct RunTracker {
    algorithm: Algorithm,
    stage: RunStage,
}

impl RunTracker {
    pub(crate) fn new(algorithm: Algorithm) -> Self {
        trace!(%algorithm, stage = ?RunStage::Idle, "run created");
        Self { algorithm, stage: RunStage::Idle }
    }

    pub(crate) fn advance(&mut self, next: RunStage) {
        trace!(algorithm = %self.algorithm, from = ?self.stage, to = ?next, "run stage");
        self.stage = next;
    }

    pub(crate) fn fail(&mut self, kind: ErrorKind) {
        warn!(algorithm = %self.algorithm, at = ?self.stage, ?kind, "run aborted");
        self.stage = RunStage::Failed(kind);
    }

    #[cfg(test)]
    pub(crate) fn stage(&self) -> RunStage {
        self.stage
    }
}

/// One backend invocation unit in flattened run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// Identifier of the enclosing test group.
    pub group_id: u64,
    /// Identifier of the test case.
    pub case_id: u64,
    /// Password carried by the test case.
    pub password: &'a str,
    /// Engine identifier from the enclosing group.
    pub engine_id: &'a str,
}

/// Outcome of one accepted test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    /// Group identifier carried through from the input.
    pub group_id: u64,
    /// Case identifier carried through from the input.
    pub case_id: u64,
    /// Derived output produced by the backend.
    pub output: Vec<u8>,
}

/// Drives the backend through every invocation in order.
///
/// The run's counter advances on every attempt before the outcome is
/// examined. The first injected fault or backend failure aborts the whole
/// run; no partial results are surfaced.
///
/// # Errors
/// Returns [`EngineError::CryptoBackendFailure`] carrying the invocation
/// index at which the run aborted.
pub fn run_cases<'a, I>(
    invocations: I,
    capability: &AlgorithmCapability,
    options: RunOptions,
) -> EngineResult<Vec<CaseResult>>
where
    I: IntoIterator<Item = Invocation<'a>>,
{
    let mut counter = InvocationCounter::new();
    let mut results = Vec::new();

    for invocation in invocations {
        let attempt = counter.next_attempt();
        if options.fault.fires_at(attempt) {
            warn!(invocation = attempt, "injected backend fault");
            return Err(EngineError::CryptoBackendFailure { invocation: attempt });
        }

        let input = BackendInput {
            password: invocation.password,
            engine_id: invocation.engine_id,
            parameters: capability.parameters(),
        };
        match capability.backend().compute(&input) {
            Ok(output) => {
                debug!(
                    tg_id = invocation.group_id,
                    tc_id = invocation.case_id,
                    invocation = attempt,
                    "case accepted"
                );
                results.push(CaseResult {
                    group_id: invocation.group_id,
                    case_id: invocation.case_id,
                    output,
                });
            }
            Err(failure) => {
                warn!(
                    tg_id = invocation.group_id,
                    tc_id = invocation.case_id,
                    invocation = attempt,
                    %failure,
                    "backend failure"
                );
                return Err(EngineError::CryptoBackendFailure { invocation: attempt });
            }
        }
    }

    Ok(results)
}
