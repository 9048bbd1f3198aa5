mod report;

pub use report::{CheckTally, ReportConfig, Reporter, RunReport};

use std::time::{Duration, Instant};

/// Timing envelope for one call against the target service.
///
/// Create the record immediately before issuing the call and finish it with the call's
/// result. Whether the response was a success at the HTTP level is not the record's
/// concern; the error flag tracks transport failures only.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    operation_id: String,
    started: Instant,
    elapsed: Option<Duration>,
    is_error: bool,
}

impl OperationRecord {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            started: Instant::now(),
            elapsed: None,
            is_error: false,
        }
    }

    /// Stop the clock and capture whether the call failed at the transport level.
    pub fn finish<T, E>(mut self, result: &Result<T, E>) -> Self {
        self.elapsed = Some(self.started.elapsed());
        self.is_error = result.is_err();
        self
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}
