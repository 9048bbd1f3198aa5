use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared signal that stops virtual users from starting new iterations.
///
/// Firing the signal is a drain, not a preemption: listeners observe it between
/// iterations and stop scheduling new work, while anything already in flight is left to
/// finish. The handle is fired by the duration deadline or by Ctrl-C, whichever comes
/// first, and firing it more than once is harmless.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    fired: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            log::debug!("Shutdown signal fired more than once");
        }
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener {
            fired: self.fired.clone(),
        }
    }
}

/// Read-only view of the shutdown signal, handed to each place that needs to observe it.
#[derive(Debug, Clone)]
pub struct DelegatedShutdownListener {
    fired: Arc<AtomicBool>,
}

impl DelegatedShutdownListener {
    /// Point in time check whether the shutdown signal has been fired. Once this returns
    /// true it never returns false again.
    pub fn should_shutdown(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
