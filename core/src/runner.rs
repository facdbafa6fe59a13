//! Sequential phase execution with per-phase timeouts.

use std::time::Instant;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::error::{FatalError, PhaseError};
use crate::log::LogLevel;
use crate::phase::PhaseDescriptor;
use crate::target::NormalizedTarget;

/// Run every phase in order, each to completion or its own timeout, before
/// starting the next. Tool errors, timeouts and payloads of the wrong kind are
/// logged and skipped; a
/// transport failure stops the run. `publish` is called after each phase.
///
/// Returns how many phases succeeded.
pub async fn run_phases<F>(
    ctx: &mut RunContext,
    target: &NormalizedTarget,
    phases: &[PhaseDescriptor],
    mut publish: F,
) -> Result<usize, FatalError>
where
    F: FnMut(&RunContext),
{
    let mut succeeded = 0;
    for (i, phase) in phases.iter().enumerate() {
        let ordinal = i + 1;
        info!(phase = %phase.kind, host = %target, "[Phase {}] {} started", ordinal, phase.kind.title());
        let started = Instant::now();
        let outcome = match timeout(phase.timeout, phase.invoker.invoke(target)).await {
            Ok(r) => r,
            Err(_) => Err(PhaseError::TimedOut(phase.timeout)),
        }
        .and_then(|payload| match payload.kind() {
            got if got == phase.kind => Ok(payload),
            got => Err(PhaseError::WrongPayload { expected: phase.kind, got }),
        });
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(payload) => {
                let message = format!("[Phase {}] {}", ordinal, payload.summary());
                ctx.apply(payload);
                ctx.record(LogLevel::Success, message);
                succeeded += 1;
                info!(phase = %phase.kind, elapsed_ms, "phase finished");
            }
            Err(PhaseError::Transport(e)) => {
                warn!(phase = %phase.kind, elapsed_ms, error = %e, "phase transport failure, aborting run");
                return Err(FatalError::Transport(e));
            }
            Err(e) => {
                warn!(phase = %phase.kind, elapsed_ms, error = %e, "phase failed, continuing");
                ctx.record(LogLevel::Error, format!("{}: {}", phase.kind.failure_label(), e));
            }
        }
        publish(ctx);
    }
    Ok(succeeded)
}
