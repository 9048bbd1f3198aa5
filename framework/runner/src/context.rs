use std::fmt::Debug;
use std::sync::Arc;

use gale_core::prelude::{DelegatedShutdownListener, ShutdownHandle};
use gale_instruments::Reporter;

use crate::executor::Executor;

/// Marker for the user value slots carried by the contexts.
pub trait UserValuesConstraint: Default + Debug + Send + Sync + 'static {}

/// Scenario-global context, shared read-only between all virtual users.
pub struct RunnerContext<RV: UserValuesConstraint> {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    shutdown_handle: ShutdownHandle,
    connection_string: String,
    run_id: String,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        shutdown_handle: ShutdownHandle,
        connection_string: String,
        run_id: String,
    ) -> Self {
        Self {
            executor,
            reporter,
            shutdown_handle,
            connection_string,
            run_id,
            value: Default::default(),
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn reporter(&self) -> Arc<Reporter> {
        self.reporter.clone()
    }

    /// The base URL of the service under test.
    pub fn get_connection_string(&self) -> &str {
        &self.connection_string
    }

    /// The identifier for this run, unique per invocation unless overridden.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Stop the scenario early, as if the duration deadline had passed. Virtual users
    /// finish their in-flight iteration and stop.
    pub fn force_stop_scenario(&self) {
        self.shutdown_handle.shutdown();
    }

    pub fn get(&self) -> &RV {
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }
}

/// Per virtual user context. Owned exclusively by that virtual user's thread.
pub struct AgentContext<RV: UserValuesConstraint, V: UserValuesConstraint> {
    agent_index: usize,
    agent_id: String,
    runner_context: Arc<RunnerContext<RV>>,
    shutdown_listener: DelegatedShutdownListener,
    value: V,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> AgentContext<RV, V> {
    pub(crate) fn new(
        agent_index: usize,
        agent_id: String,
        runner_context: Arc<RunnerContext<RV>>,
        shutdown_listener: DelegatedShutdownListener,
    ) -> Self {
        Self {
            agent_index,
            agent_id,
            runner_context,
            shutdown_listener,
            value: Default::default(),
        }
    }

    /// The virtual user's identity, 0-based and stable for the whole run.
    pub fn agent_index(&self) -> usize {
        self.agent_index
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext<RV>> {
        &self.runner_context
    }

    pub fn shutdown_listener(&self) -> &DelegatedShutdownListener {
        &self.shutdown_listener
    }

    pub fn get(&self) -> &V {
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut V {
        &mut self.value
    }
}
