use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::FatalError;
use crate::log::{ActivityLog, LogLevel};
use crate::phase::PhasePayload;
use crate::results::{merge, AssessmentResults};
use crate::status::AssessmentStatus;
use crate::target::{NormalizedTarget, RawTarget};

/// Everything a display needs about the current or last run. A fresh one is
/// built at the start of every run, so nothing leaks from the previous run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    target: Option<RawTarget>,
    normalized: Option<NormalizedTarget>,
    status: AssessmentStatus,
    log: ActivityLog,
    results: AssessmentResults,
}

impl RunContext {
    pub(crate) fn begin(raw: RawTarget) -> Self {
        let mut ctx = RunContext { status: AssessmentStatus::Scanning, ..Default::default() };
        ctx.log.append(LogLevel::Info, format!("Starting Assessment for: {}", raw));
        ctx.target = Some(raw);
        ctx
    }

    pub fn target(&self) -> Option<&RawTarget> {
        self.target.as_ref()
    }

    pub fn normalized(&self) -> Option<&NormalizedTarget> {
        self.normalized.as_ref()
    }

    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn results(&self) -> &AssessmentResults {
        &self.results
    }

    pub(crate) fn record(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log.append(level, message);
    }

    pub(crate) fn set_normalized(&mut self, target: NormalizedTarget) {
        self.log.append(LogLevel::Success, format!("Target Validated ({})", target));
        self.normalized = Some(target);
    }

    pub(crate) fn apply(&mut self, payload: PhasePayload) {
        self.results = merge(&self.results, payload);
    }

    pub(crate) fn finish(&mut self) {
        self.settle(AssessmentStatus::Ready);
        self.log.append(LogLevel::Success, "Assessment Finished. Check Results below.");
    }

    /// No-op once the run has settled; the log never contradicts the status.
    pub(crate) fn abort(&mut self, fatal: &FatalError) {
        if self.status.is_terminal() {
            warn!(error = %fatal, status = %self.status, "abort after run settled, ignoring");
            return;
        }
        let level = match fatal {
            FatalError::Rejected(_) => LogLevel::Error,
            FatalError::Transport(_) | FatalError::Interrupted => LogLevel::Critical,
        };
        self.log.append(level, fatal.to_string());
        self.settle(AssessmentStatus::Error);
    }

    fn settle(&mut self, to: AssessmentStatus) {
        let next = match to {
            AssessmentStatus::Ready => self.status.complete(),
            _ => self.status.fail(),
        };
        match next {
            Ok(s) => self.status = s,
            Err(e) => error!(%e, "run settled twice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_resets_everything() {
        let ctx = RunContext::begin("example.com".into());
        assert_eq!(ctx.status(), AssessmentStatus::Scanning);
        assert_eq!(ctx.log().len(), 1);
        assert_eq!(ctx.log().entries()[0].message, "Starting Assessment for: example.com");
        assert!(ctx.results().is_empty());
        assert!(ctx.normalized().is_none());
    }

    #[test]
    fn settles_only_once() {
        let mut ctx = RunContext::begin("example.com".into());
        ctx.finish();
        let settled = ctx.log().len();
        ctx.abort(&FatalError::Interrupted);
        assert_eq!(ctx.status(), AssessmentStatus::Ready);
        assert_eq!(ctx.log().len(), settled);
        assert_eq!(ctx.log().last().unwrap().level, LogLevel::Success);
    }

    #[test]
    fn rejection_logs_at_error_level() {
        let mut ctx = RunContext::begin("bad".into());
        ctx.abort(&FatalError::Rejected("Invalid Domain or IP format".into()));
        let last = ctx.log().last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.message, "Validation Failed: Invalid Domain or IP format");
        assert_eq!(ctx.status(), AssessmentStatus::Error);
    }
}
