use std::future::Future;

/// Wrapper around the Tokio runtime that virtual user threads use to run async code.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
}

impl Executor {
    pub(crate) fn new(runtime: tokio::runtime::Runtime) -> Self {
        Self { runtime }
    }

    /// Run async code in place, blocking until it completes.
    ///
    /// In-flight work is never cancelled by the shutdown signal. Draining happens at
    /// iteration boundaries, so a future submitted here should bound its own waiting,
    /// for example with a request timeout on the HTTP client.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.runtime.block_on(fut)
    }

    /// Submit async code to be run in the background.
    ///
    /// There is no guarantee that the runner will wait for the future to complete before
    /// shutting down. In agent hooks, prefer [Executor::execute_in_place] so that the
    /// work completes before the behaviour is scheduled again.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.runtime.spawn(fut);
    }
}
