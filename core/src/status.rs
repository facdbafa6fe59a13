use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TransitionError;

/// Lifecycle of one client instance: `IDLE -> SCANNING -> READY | ERROR`,
/// and back to SCANNING on the next run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssessmentStatus {
    #[default]
    Idle,
    Scanning,
    Ready,
    Error,
}

impl AssessmentStatus {
    pub fn is_scanning(self) -> bool {
        self == AssessmentStatus::Scanning
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AssessmentStatus::Ready | AssessmentStatus::Error)
    }

    /// Whether a display should let the user submit a new target.
    pub fn accepts_input(self) -> bool {
        !self.is_scanning()
    }

    pub fn start(self) -> Result<AssessmentStatus, TransitionError> {
        self.to(AssessmentStatus::Scanning)
    }

    pub fn complete(self) -> Result<AssessmentStatus, TransitionError> {
        self.to(AssessmentStatus::Ready)
    }

    pub fn fail(self) -> Result<AssessmentStatus, TransitionError> {
        self.to(AssessmentStatus::Error)
    }

    fn to(self, next: AssessmentStatus) -> Result<AssessmentStatus, TransitionError> {
        use AssessmentStatus::*;
        match (self, next) {
            (Idle | Ready | Error, Scanning) => Ok(next),
            (Scanning, Ready | Error) => Ok(next),
            (from, to) => Err(TransitionError { from, to }),
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssessmentStatus::Idle => "IDLE",
            AssessmentStatus::Scanning => "SCANNING",
            AssessmentStatus::Ready => "READY",
            AssessmentStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::AssessmentStatus::*;

    #[test]
    fn start_from_any_resting_state() {
        assert_eq!(Idle.start().unwrap(), Scanning);
        assert_eq!(Ready.start().unwrap(), Scanning);
        assert_eq!(Error.start().unwrap(), Scanning);
    }

    #[test]
    fn reentrant_start_rejected() {
        let err = Scanning.start().unwrap_err();
        assert_eq!(err.from, Scanning);
        assert_eq!(err.to, Scanning);
    }

    #[test]
    fn terminal_only_from_scanning() {
        assert_eq!(Scanning.complete().unwrap(), Ready);
        assert_eq!(Scanning.fail().unwrap(), Error);
        assert!(Idle.complete().is_err());
        assert!(Ready.fail().is_err());
        assert!(Error.complete().is_err());
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Scanning).unwrap(), "\"SCANNING\"");
        assert_eq!(Ready.to_string(), "READY");
        assert!(!Scanning.accepts_input());
        assert!(Error.is_terminal());
    }
}
