use std::sync::Arc;

use anyhow::Context;
use deal_client::prelude::*;
use gale_runner::prelude::*;

#[derive(Debug, Default)]
struct RunnerValues {}

impl UserValuesConstraint for RunnerValues {}

#[derive(Debug, Default)]
struct ScenarioValues {
    client: Option<Arc<DealsClient>>,
    ids: Option<DealIdSource>,
}

impl UserValuesConstraint for ScenarioValues {}

fn agent_setup(ctx: &mut AgentContext<RunnerValues, ScenarioValues>) -> HookResult {
    let base_url = ctx.runner_context().get_connection_string().to_string();
    let reporter = ctx.runner_context().reporter();
    let prefix = format!("GALE_{}", ctx.runner_context().run_id());

    ctx.get_mut().client = Some(Arc::new(DealsClient::new(&base_url, reporter)?));
    ctx.get_mut().ids = Some(DealIdSource::system(prefix));

    Ok(())
}

fn agent_behaviour(ctx: &mut AgentContext<RunnerValues, ScenarioValues>) -> HookResult {
    let client = ctx
        .get()
        .client
        .clone()
        .context("Agent setup did not run")?;
    let ids = ctx.get().ids.clone().context("Agent setup did not run")?;
    let vu_index = ctx.agent_index();
    let reporter = ctx.runner_context().reporter();

    let outcome = ctx
        .runner_context()
        .executor()
        .execute_in_place(async move {
            let workflow = DealWorkflow::new(client.as_ref(), &ids, vu_index);
            Ok(workflow.run_once().await)
        })?;

    for check in outcome.checks() {
        reporter.add_check(check.name(), check.passed());
    }

    match outcome.into_status() {
        IterationStatus::Completed => Ok(()),
        IterationStatus::Aborted(abort) => Err(abort.into()),
    }
}

fn main() -> GaleResult<()> {
    let builder = ScenarioDefinitionBuilder::<RunnerValues, ScenarioValues>::new_with_init(env!(
        "CARGO_PKG_NAME"
    ))
    .with_default_agents(10)
    .with_default_duration_s(15)
    .with_default_pacing_ms(1000)
    .use_agent_setup(agent_setup)
    .use_agent_behaviour(agent_behaviour);

    let report = run(builder)?;

    log::info!(
        "Finished: {} iterations, {} aborted",
        report.iterations,
        report.iterations_aborted
    );

    Ok(())
}
