use std::sync::Arc;
use std::time::Duration;

use gale_runner::prelude::{
    run, AgentContext, GaleScenarioCli, HookResult, IterationAbort, ReporterOpt, ResponseSnapshot,
    RunnerContext, ScenarioDefinitionBuilder, UserValuesConstraint,
};

#[derive(Default, Debug)]
struct RunnerContextValue {}

impl UserValuesConstraint for RunnerContextValue {}

#[derive(Default, Debug)]
struct AgentContextValue {
    value: i32,
}

impl UserValuesConstraint for AgentContextValue {}

fn sample_cli_cfg() -> GaleScenarioCli {
    GaleScenarioCli {
        connection_string: None,
        agents: Some(1),
        duration: None,
        pacing_ms: Some(0),
        soak: false,
        no_progress: true,
        reporter: ReporterOpt::Noop,
        run_id: None,
    }
}

#[test]
fn propagate_error_in_setup_hook() {
    fn setup(_ctx: &mut RunnerContext<RunnerContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in setup hook"))
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "propagate_error_in_setup_hook",
        sample_cli_cfg(),
    )
    .with_default_duration_s(5)
    .use_setup(setup);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "Error in setup hook");
}

#[test]
fn capture_error_in_agent_setup() {
    fn agent_setup(_ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>) -> HookResult {
        Err(anyhow::anyhow!("Error in agent setup hook"))
    }

    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        Ok(())
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "capture_error_in_agent_setup",
        sample_cli_cfg(),
    )
    .with_default_duration_s(5)
    .use_agent_setup(agent_setup)
    .use_agent_behaviour(agent_behaviour);

    let result = run(scenario);

    // The agent stops without running its behaviour, but the run itself is clean.
    let report = result.unwrap();
    assert_eq!(report.iterations, 0);
}

#[test]
fn abort_is_scoped_to_the_iteration() {
    fn agent_behaviour(
        ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        if ctx.get().value < 5 {
            ctx.get_mut().value += 1;
        } else {
            // Save time running this test by stopping once this has run a few times.
            ctx.runner_context().force_stop_scenario();
        }

        Err(IterationAbort::check_failed(
            "single-create",
            "single create status is 201",
            &ResponseSnapshot::of_status(500),
        )
        .into())
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "abort_is_scoped_to_the_iteration",
        sample_cli_cfg(),
    )
    .with_default_duration_s(5)
    .use_agent_behaviour(agent_behaviour);

    let report = run(scenario).unwrap();

    // The loop kept running after each abort, so several iterations were recorded.
    assert!(report.iterations >= 5, "got {} iterations", report.iterations);
    assert_eq!(report.iterations, report.iterations_aborted);
}

#[test]
fn completed_iterations_are_counted() {
    fn agent_behaviour(
        ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        if ctx.get().value < 5 {
            ctx.get_mut().value += 1;
        } else {
            ctx.runner_context().force_stop_scenario();
        }

        Ok(())
    }

    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "completed_iterations_are_counted",
        sample_cli_cfg(),
    )
    .with_default_duration_s(5)
    .use_agent_behaviour(agent_behaviour);

    let report = run(scenario).unwrap();

    assert!(report.iterations >= 5);
    assert_eq!(report.iterations_aborted, 0);
}

#[test]
fn deadline_drains_in_flight_iterations() {
    fn agent_behaviour(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        std::thread::sleep(Duration::from_millis(100));
        Ok(())
    }

    let mut cfg = sample_cli_cfg();
    cfg.agents = Some(3);
    cfg.duration = Some(1);
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "deadline_drains_in_flight_iterations",
        cfg,
    )
    .use_agent_behaviour(agent_behaviour);

    // The run must come back shortly after the deadline with all in-flight iterations
    // finished, not hang waiting on anything.
    let report = run(scenario).unwrap();

    assert!(report.iterations >= 3);
    assert_eq!(report.iterations_aborted, 0);
}

#[test]
fn capture_error_in_agent_teardown() {
    fn agent_teardown(
        _ctx: &mut AgentContext<RunnerContextValue, AgentContextValue>,
    ) -> HookResult {
        Err(anyhow::anyhow!("Error in agent teardown hook"))
    }

    let mut cfg = sample_cli_cfg();
    cfg.duration = Some(1);
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "capture_error_in_agent_teardown",
        cfg,
    )
    .use_agent_teardown(agent_teardown);

    assert!(run(scenario).is_ok());
}

#[test]
fn capture_error_in_teardown() {
    fn teardown(_ctx: Arc<RunnerContext<RunnerContextValue>>) -> HookResult {
        Err(anyhow::anyhow!("Error in teardown hook"))
    }

    let mut cfg = sample_cli_cfg();
    cfg.duration = Some(1);
    let scenario = ScenarioDefinitionBuilder::<RunnerContextValue, AgentContextValue>::new(
        "capture_error_in_teardown",
        cfg,
    )
    .use_teardown(teardown);

    assert!(run(scenario).is_ok());
}
