//! Run controller: validation, then the phase list, with the live state
//! published to any number of readers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::context::RunContext;
use crate::error::{FatalError, TransportError, ValidationError};
use crate::phase::PhaseDescriptor;
use crate::runner::run_phases;
use crate::status::AssessmentStatus;
use crate::target::{NormalizedTarget, RawTarget, Validator};

pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Blank input; nothing changed.
    EmptyTarget,
    /// A run is already in progress on this instance.
    AlreadyScanning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Finished(RunContext),
    Ignored(IgnoreReason),
}

impl RunOutcome {
    pub fn context(&self) -> Option<&RunContext> {
        match self {
            RunOutcome::Finished(ctx) => Some(ctx),
            RunOutcome::Ignored(_) => None,
        }
    }

    pub fn into_context(self) -> Option<RunContext> {
        match self {
            RunOutcome::Finished(ctx) => Some(ctx),
            RunOutcome::Ignored(_) => None,
        }
    }
}

pub struct Assessor {
    validator: Arc<dyn Validator>,
    phases: Vec<PhaseDescriptor>,
    validation_timeout: Duration,
    state: watch::Sender<RunContext>,
}

impl Assessor {
    pub fn new(validator: impl Validator + 'static, phases: Vec<PhaseDescriptor>) -> Self {
        let (state, _) = watch::channel(RunContext::default());
        Assessor { validator: Arc::new(validator), phases, validation_timeout: VALIDATION_TIMEOUT, state }
    }

    pub fn with_validation_timeout(mut self, d: Duration) -> Self {
        self.validation_timeout = d;
        self
    }

    pub fn phases(&self) -> &[PhaseDescriptor] {
        &self.phases
    }

    pub fn status(&self) -> AssessmentStatus {
        self.state.borrow().status()
    }

    pub fn snapshot(&self) -> RunContext {
        self.state.borrow().clone()
    }

    /// Live view; a new value is published after every log entry or merge.
    pub fn subscribe(&self) -> watch::Receiver<RunContext> {
        self.state.subscribe()
    }

    /// Run one full assessment. Blank input and calls made while another run
    /// is in flight are ignored without touching the current state.
    pub async fn run(&self, raw: impl Into<RawTarget>) -> RunOutcome {
        let raw = raw.into();
        if raw.is_empty() {
            return RunOutcome::Ignored(IgnoreReason::EmptyTarget);
        }
        let started = self.state.send_if_modified(|current| match current.status().start() {
            Ok(_) => {
                *current = RunContext::begin(raw.clone());
                true
            }
            Err(_) => false,
        });
        if !started {
            warn!(host = %raw, "assessment already running, ignoring start");
            return RunOutcome::Ignored(IgnoreReason::AlreadyScanning);
        }
        info!(host = %raw, phases = self.phases.len(), "assessment started");

        let mut guard = InterruptGuard { state: &self.state, armed: true };
        let mut ctx = self.snapshot();
        match self.drive(&mut ctx).await {
            Ok(succeeded) => {
                ctx.finish();
                info!(succeeded, total = self.phases.len(), "assessment finished");
            }
            Err(fatal) => {
                ctx.abort(&fatal);
                warn!(error = %fatal, "assessment aborted");
            }
        }
        guard.armed = false;
        self.state.send_replace(ctx.clone());
        RunOutcome::Finished(ctx)
    }

    async fn drive(&self, ctx: &mut RunContext) -> Result<usize, FatalError> {
        let raw = ctx.target().cloned().unwrap_or_else(|| RawTarget(String::new()));
        let target = self.validate(&raw).await?;
        if target.reachable() == Some(false) {
            warn!(host = %target, "validator could not resolve target");
        }
        debug!(raw = %raw, normalized = %target, "target validated");
        ctx.set_normalized(target.clone());
        self.publish(ctx);
        run_phases(ctx, &target, &self.phases, |c| self.publish(c)).await
    }

    async fn validate(&self, raw: &RawTarget) -> Result<NormalizedTarget, FatalError> {
        match timeout(self.validation_timeout, self.validator.validate(raw)).await {
            Ok(Ok(t)) => Ok(t),
            Ok(Err(ValidationError::Rejected(msg))) => Err(FatalError::Rejected(msg)),
            Ok(Err(ValidationError::Transport(e))) => Err(FatalError::Transport(e)),
            Err(_) => Err(FatalError::Transport(TransportError::Timeout {
                endpoint: "/validate".to_string(),
                after: self.validation_timeout,
            })),
        }
    }

    fn publish(&self, ctx: &RunContext) {
        self.state.send_replace(ctx.clone());
    }
}

/// Settles the shared state as ERROR if a run future is dropped mid-flight.
struct InterruptGuard<'a> {
    state: &'a watch::Sender<RunContext>,
    armed: bool,
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|ctx| {
                if ctx.status().is_scanning() {
                    ctx.abort(&FatalError::Interrupted);
                }
            });
        }
    }
}
