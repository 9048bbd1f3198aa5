use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::abort::IterationAbort;

/// Longest body excerpt a snapshot keeps. Enough to see an error payload without
/// flooding the logs when a check against a large collection fails.
const BODY_EXCERPT_MAX: usize = 200;

/// Point-in-time view of the response a check was graded against.
///
/// Kept with every [CheckResult] so a failing run can report what was actually observed,
/// not just which predicate rejected it.
#[derive(Debug, Clone, Default)]
pub struct ResponseSnapshot {
    status: Option<u16>,
    body: Option<String>,
}

impl ResponseSnapshot {
    pub fn of_status(status: u16) -> Self {
        Self {
            status: Some(status),
            body: None,
        }
    }

    pub fn with_body(status: u16, body: impl Into<String>) -> Self {
        let body: String = body.into();
        let excerpt = if body.chars().count() > BODY_EXCERPT_MAX {
            body.chars().take(BODY_EXCERPT_MAX).chain("...".chars()).collect()
        } else {
            body
        };

        Self {
            status: Some(status),
            body: Some(excerpt),
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl fmt::Display for ResponseSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.body) {
            (Some(status), Some(body)) => write!(f, "status {status}, body {body}"),
            (Some(status), None) => write!(f, "status {status}"),
            (None, _) => write!(f, "no response"),
        }
    }
}

/// Anything a check can be graded against. The snapshot survives into the check result
/// and the abort diagnostic, so it should carry the response's observable surface.
pub trait CheckSubject {
    fn snapshot(&self) -> ResponseSnapshot;
}

/// The outcome of grading one named predicate against a response.
#[derive(Debug, Clone)]
pub struct CheckResult {
    name: String,
    passed: bool,
    snapshot: ResponseSnapshot,
}

impl CheckResult {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// What the graded response looked like, whether the check passed or not.
    pub fn snapshot(&self) -> &ResponseSnapshot {
        &self.snapshot
    }
}

/// Grade a named predicate against a response.
///
/// This never panics. A predicate that panics while grading, for example by indexing into
/// a body that isn't there, is treated as a failed check rather than a crash.
pub fn evaluate<R: CheckSubject>(
    name: &str,
    response: &R,
    predicate: impl FnOnce(&R) -> bool,
) -> CheckResult {
    let snapshot = response.snapshot();
    let passed = catch_unwind(AssertUnwindSafe(|| predicate(response))).unwrap_or_else(|_| {
        log::warn!("Check [{name}] panicked while grading, treating as failed");
        false
    });

    if !passed {
        log::debug!("Check [{name}] failed, observed {snapshot}");
    }

    CheckResult {
        name: name.to_string(),
        passed,
        snapshot,
    }
}

/// Gate a workflow step on a batch of check results.
///
/// The first failed check aborts the iteration, naming the check and the step it belongs
/// to. All checks in the batch have already been graded at this point, so a failing batch
/// still contributes every result to the iteration's outcome.
pub fn require_all(step: &str, results: &[CheckResult]) -> Result<(), IterationAbort> {
    match results.iter().find(|result| !result.passed) {
        Some(failed) => Err(IterationAbort::check_failed(
            step,
            &failed.name,
            &failed.snapshot,
        )),
        None => Ok(()),
    }
}

/// Everything one full pass of a workflow produced: the checks that were graded, in
/// order, and whether the pass ran to completion or was aborted part way through.
#[derive(Debug)]
pub struct IterationOutcome {
    checks: Vec<CheckResult>,
    status: IterationStatus,
}

#[derive(Debug, Clone)]
pub enum IterationStatus {
    /// Every step was reached and checked, regardless of individual pass/fail.
    Completed,
    /// A gating check batch failed and the remaining steps were skipped.
    Aborted(IterationAbort),
}

impl IterationOutcome {
    pub fn completed(checks: Vec<CheckResult>) -> Self {
        Self {
            checks,
            status: IterationStatus::Completed,
        }
    }

    pub fn aborted(checks: Vec<CheckResult>, abort: IterationAbort) -> Self {
        Self {
            checks,
            status: IterationStatus::Aborted(abort),
        }
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn status(&self) -> &IterationStatus {
        &self.status
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, IterationStatus::Aborted(_))
    }

    pub fn into_status(self) -> IterationStatus {
        self.status
    }
}
