use std::fmt::Debug;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond wall clock behind deal id generation. Injectable so tests can supply
/// deterministic time and assert exact uniqueness behaviour.
pub trait Clock: Debug + Send + Sync {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Scope for one generated id: what it is for, which virtual user is asking, and the
/// batch slot when the id is one of several in a bulk payload.
#[derive(Debug, Clone, Copy)]
pub struct IdScope<'a> {
    pub kind: &'a str,
    pub vu_index: usize,
    pub sub_index: Option<u32>,
}

/// Produces run-unique deal ids.
///
/// An id is a pure composition of the run-scoped prefix, the scope's kind, the virtual
/// user index, the clock's millisecond timestamp and the optional sub-index. Distinct
/// virtual users can never collide, and the prefix keeps consecutive runs apart.
#[derive(Debug, Clone)]
pub struct DealIdSource {
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl DealIdSource {
    pub fn new(prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            prefix: prefix.into(),
            clock,
        }
    }

    pub fn system(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Arc::new(SystemClock))
    }

    pub fn next(&self, scope: IdScope<'_>) -> String {
        let millis = self.clock.now_millis();
        match scope.sub_index {
            Some(sub_index) => format!(
                "{}_{}_{}_{}_{}",
                self.prefix, scope.kind, scope.vu_index, millis, sub_index
            ),
            None => format!("{}_{}_{}_{}", self.prefix, scope.kind, scope.vu_index, millis),
        }
    }
}
