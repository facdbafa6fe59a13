//! Core types and the assessment state machine shared by the phase modules.

pub mod assessment;
pub mod context;
pub mod error;
pub mod log;
pub mod payload;
pub mod phase;
pub mod results;
pub mod runner;
pub mod status;
pub mod target;

pub use assessment::{Assessor, IgnoreReason, RunOutcome, VALIDATION_TIMEOUT};
pub use context::RunContext;
pub use error::{FatalError, PhaseError, TransitionError, TransportError, ValidationError};
pub use log::{ActivityLog, LogEntry, LogLevel};
pub use payload::{
    Discovery, Finding, FindingInfo, Infrastructure, Inventory, NiktoReport, NucleiReport, OpenPort,
    Technologies, ToolReport, VulnReport, ZapReport,
};
pub use phase::{PhaseDescriptor, PhaseInvoker, PhaseKind, PhasePayload, PhaseResult};
pub use results::{merge, AssessmentResults, PortSummary, ResultCategory};
pub use status::AssessmentStatus;
pub use target::{NormalizedTarget, RawTarget, TargetKind, Validator};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
