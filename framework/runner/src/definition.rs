use std::sync::Arc;
use std::time::Duration;

use anyhow::ensure;

use crate::cli::{GaleScenarioCli, ReporterOpt};
use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type GlobalHook<RV> = fn(Arc<RunnerContext<RV>>) -> HookResult;
pub type AgentHookMut<RV, V> = fn(&mut AgentContext<RV, V>) -> HookResult;

const DEFAULT_CONNECTION_STRING: &str = "http://localhost:8080/api/deals";
const DEFAULT_AGENTS: usize = 10;
const DEFAULT_DURATION_S: u64 = 15;
const DEFAULT_PACING_MS: u64 = 1000;

/// The builder for a scenario definition.
///
/// This must be used at the start of a scenario to define what you want to run. CLI
/// flags take precedence over the defaults set here, which in turn take precedence over
/// the built-in defaults.
pub struct ScenarioDefinitionBuilder<RV: UserValuesConstraint, V: UserValuesConstraint> {
    /// The name of the scenario, which should be unique within the test suite.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    cli: GaleScenarioCli,
    default_agents: Option<usize>,
    default_duration_s: Option<u64>,
    default_pacing_ms: Option<u64>,
    setup_fn: Option<GlobalHookMut<RV>>,
    setup_agent_fn: Option<AgentHookMut<RV, V>>,
    agent_behaviour_fn: Option<AgentHookMut<RV, V>>,
    teardown_agent_fn: Option<AgentHookMut<RV, V>>,
    teardown_fn: Option<GlobalHook<RV>>,
}

/// The resolved, immutable configuration and hooks for one run.
pub(crate) struct ScenarioDefinition<RV: UserValuesConstraint, V: UserValuesConstraint> {
    pub name: String,
    pub connection_string: String,
    pub agents: usize,
    /// `None` for a soak test, which runs until stopped.
    pub duration: Option<Duration>,
    pub pacing: Duration,
    pub no_progress: bool,
    pub reporter: ReporterOpt,
    pub run_id: String,
    pub setup_fn: Option<GlobalHookMut<RV>>,
    pub setup_agent_fn: Option<AgentHookMut<RV, V>>,
    pub agent_behaviour_fn: Option<AgentHookMut<RV, V>>,
    pub teardown_agent_fn: Option<AgentHookMut<RV, V>>,
    pub teardown_fn: Option<GlobalHook<RV>>,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ScenarioDefinitionBuilder<RV, V> {
    /// Initialise a new scenario definition from the scenario name and already-parsed
    /// command line arguments. Mostly useful for tests; scenario binaries should prefer
    /// [ScenarioDefinitionBuilder::new_with_init].
    pub fn new(name: &str, cli: GaleScenarioCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            default_agents: None,
            default_duration_s: None,
            default_pacing_ms: None,
            setup_fn: None,
            setup_agent_fn: None,
            agent_behaviour_fn: None,
            teardown_agent_fn: None,
            teardown_fn: None,
        }
    }

    /// Initialise a new scenario definition, parsing the command line and setting up
    /// logging as a side effect.
    pub fn new_with_init(name: &str) -> Self {
        let cli = crate::init::init();
        Self::new(name, cli)
    }

    /// The number of virtual users to run when `--agents` is not given.
    pub fn with_default_agents(mut self, agents: usize) -> Self {
        self.default_agents = Some(agents);
        self
    }

    /// The run duration in seconds when `--duration` is not given.
    pub fn with_default_duration_s(mut self, duration_s: u64) -> Self {
        self.default_duration_s = Some(duration_s);
        self
    }

    /// The delay between one virtual user's iterations when `--pacing-ms` is not given.
    pub fn with_default_pacing_ms(mut self, pacing_ms: u64) -> Self {
        self.default_pacing_ms = Some(pacing_ms);
        self
    }

    /// Set the global setup hook, run once before any virtual users are started.
    pub fn use_setup(mut self, setup_fn: GlobalHookMut<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Set the setup hook run once by each virtual user as it starts.
    pub fn use_agent_setup(mut self, setup_agent_fn: AgentHookMut<RV, V>) -> Self {
        self.setup_agent_fn = Some(setup_agent_fn);
        self
    }

    /// Set the behaviour that each virtual user runs in a loop until the run ends. One
    /// call of the hook is one iteration.
    pub fn use_agent_behaviour(mut self, behaviour: AgentHookMut<RV, V>) -> Self {
        self.agent_behaviour_fn = Some(behaviour);
        self
    }

    /// Set the teardown hook run once by each virtual user after its loop stops.
    pub fn use_agent_teardown(mut self, teardown_agent_fn: AgentHookMut<RV, V>) -> Self {
        self.teardown_agent_fn = Some(teardown_agent_fn);
        self
    }

    /// Set the global teardown hook, run best-effort after all virtual users have
    /// stopped.
    pub fn use_teardown(mut self, teardown_fn: GlobalHook<RV>) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition<RV, V>> {
        let agents = self
            .cli
            .agents
            .or(self.default_agents)
            .unwrap_or(DEFAULT_AGENTS);
        ensure!(agents > 0, "A scenario needs at least one virtual user");

        let duration = if self.cli.soak {
            None
        } else {
            Some(Duration::from_secs(
                self.cli
                    .duration
                    .or(self.default_duration_s)
                    .unwrap_or(DEFAULT_DURATION_S),
            ))
        };

        let pacing = Duration::from_millis(
            self.cli
                .pacing_ms
                .or(self.default_pacing_ms)
                .unwrap_or(DEFAULT_PACING_MS),
        );

        Ok(ScenarioDefinition {
            name: self.name,
            connection_string: self
                .cli
                .connection_string
                .unwrap_or_else(|| DEFAULT_CONNECTION_STRING.to_string()),
            agents,
            duration,
            pacing,
            no_progress: self.cli.no_progress,
            reporter: self.cli.reporter,
            run_id: self.cli.run_id.unwrap_or_else(|| nanoid::nanoid!(8)),
            setup_fn: self.setup_fn,
            setup_agent_fn: self.setup_agent_fn,
            agent_behaviour_fn: self.agent_behaviour_fn,
            teardown_agent_fn: self.teardown_agent_fn,
            teardown_fn: self.teardown_fn,
        })
    }
}
