use std::time::Duration;
use thiserror::Error;

use crate::phase::PhaseKind;
use crate::status::AssessmentStatus;

/// Failure reaching an endpoint at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{endpoint} timed out after {after:?}")]
    Timeout { endpoint: String, after: Duration },
    #[error("{endpoint} unreachable: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("{endpoint} sent an unreadable response: {reason}")]
    Decode { endpoint: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The validator looked at the target and refused it.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhaseError {
    /// The backend answered with `status: "error"`.
    #[error("{0}")]
    Tool(String),
    /// The phase ran past its own budget.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    /// The invoker answered with another phase's payload; nothing is merged.
    #[error("returned {got} results instead of {expected}")]
    WrongPayload { expected: PhaseKind, got: PhaseKind },
    #[error(transparent)]
    Transport(TransportError),
}

impl From<TransportError> for PhaseError {
    /// A request that outlives its budget counts against the phase, not the run.
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout { after, .. } => PhaseError::TimedOut(after),
            other => PhaseError::Transport(other),
        }
    }
}

impl PhaseError {
    /// Only transport failures halt the run; tool errors and phase timeouts skip the phase.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PhaseError::Transport(_))
    }
}

/// Something that stops the whole run and ends it in ERROR.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FatalError {
    #[error("Validation Failed: {0}")]
    Rejected(String),
    #[error("System Error: {0}")]
    Transport(#[from] TransportError),
    #[error("System Error: run interrupted")]
    Interrupted,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: AssessmentStatus,
    pub to: AssessmentStatus,
}
