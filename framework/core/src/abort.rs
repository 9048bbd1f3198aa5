use crate::checks::ResponseSnapshot;

/// Return this error from a workflow step or a behaviour to abort the current iteration.
///
/// Aborting is scoped to a single iteration. The virtual user's loop records the failure
/// and carries on with its next iteration after the pacing delay. Other virtual users are
/// never affected.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone)]
#[display("iteration aborted at step [{step}]: {reason}")]
pub struct IterationAbort {
    step: String,
    reason: String,
}

impl IterationAbort {
    /// An abort caused by a failed check within a step. The snapshot says what the
    /// target actually answered, so the diagnostic is actionable on its own.
    pub fn check_failed(
        step: impl Into<String>,
        check: impl Into<String>,
        observed: &ResponseSnapshot,
    ) -> Self {
        Self {
            step: step.into(),
            reason: format!("check [{}] failed, observed {observed}", check.into()),
        }
    }

    /// An abort caused by the target being unreachable, or the call timing out.
    pub fn transport(step: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            step: step.into(),
            reason: format!("transport failure: {error}"),
        }
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
