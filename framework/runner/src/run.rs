use std::sync::Arc;

use anyhow::Context;
use gale_core::prelude::IterationAbort;
use gale_instruments::{ReportConfig, RunReport};

use crate::cli::ReporterOpt;
use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};
use crate::definition::ScenarioDefinitionBuilder;
use crate::executor::Executor;
use crate::progress::start_progress;
use crate::shutdown::start_shutdown_listener;

/// Run a scenario: schedule one virtual user per agent, let each loop its behaviour
/// until the duration deadline, drain, and return the aggregate report.
///
/// The deadline never preempts an iteration. It stops new iterations from being
/// scheduled, and every virtual user finishes whatever it had in flight before its
/// thread is joined.
pub fn run<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: ScenarioDefinitionBuilder<RV, V>,
) -> anyhow::Result<RunReport> {
    let definition = definition.build()?;

    log::info!(
        "Running scenario {} with {} virtual users (run id {})",
        definition.name,
        definition.agents,
        definition.run_id
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime);
    let executor = Arc::new(Executor::new(runtime));
    let reporter = Arc::new(match definition.reporter {
        ReporterOpt::Summary => ReportConfig::default().enable_summary().init(),
        ReporterOpt::Noop => ReportConfig::default().init(),
    });

    let mut runner_context = RunnerContext::new(
        executor,
        reporter.clone(),
        shutdown_handle.clone(),
        definition.connection_string.clone(),
        definition.run_id.clone(),
    );

    if let Some(setup_fn) = &definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    // The deadline counts from here, after setup, when virtual users start being
    // scheduled.
    if let Some(duration) = definition.duration {
        if !definition.no_progress {
            start_progress(duration, shutdown_handle.new_listener());
        }

        let deadline_handle = shutdown_handle.clone();
        runner_context.executor().spawn(async move {
            tokio::time::sleep(duration).await;
            log::debug!("Run duration elapsed, draining virtual users");
            deadline_handle.shutdown();
        });
    }

    let runner_context = Arc::new(runner_context);
    let runner_context_for_teardown = runner_context.clone();

    let pacing = definition.pacing;

    let mut handles = Vec::new();
    for agent_index in 0..definition.agents {
        let runner_context = runner_context.clone();
        let reporter = reporter.clone();

        let setup_agent_fn = definition.setup_agent_fn;
        let agent_behaviour_fn = definition.agent_behaviour_fn;
        let teardown_agent_fn = definition.teardown_agent_fn;

        // One listener gates the loop, the other is handed to the behaviour so it can
        // observe the drain if it wants to.
        let cycle_shutdown_listener = shutdown_handle.new_listener();
        let delegated_shutdown_listener = shutdown_handle.new_listener();

        let agent_id = format!("vu-{}", agent_index);

        handles.push(
            std::thread::Builder::new()
                .name(agent_id.clone())
                .spawn(move || {
                    let mut context = AgentContext::new(
                        agent_index,
                        agent_id.clone(),
                        runner_context,
                        delegated_shutdown_listener,
                    );

                    if let Some(setup_agent_fn) = setup_agent_fn {
                        if let Err(e) = setup_agent_fn(&mut context) {
                            log::error!("Setup failed for {}: {:?}", agent_id, e);
                            return;
                        }
                    }

                    if let Some(behaviour) = agent_behaviour_fn {
                        loop {
                            if cycle_shutdown_listener.should_shutdown() {
                                log::debug!("Stopping {}", agent_id);
                                break;
                            }

                            match behaviour(&mut context) {
                                Ok(()) => {
                                    reporter.add_iteration(false);
                                }
                                Err(e) if e.is::<IterationAbort>() => {
                                    // Scoped to this iteration; the loop carries on.
                                    log::warn!("{}: {}", agent_id, e);
                                    reporter.add_iteration(true);
                                }
                                Err(e) => {
                                    log::error!("Behaviour failed for {}: {:?}", agent_id, e);
                                    reporter.add_iteration(true);
                                }
                            }

                            // Fixed pacing between iterations, skipped once draining so
                            // the join isn't held up by a sleep.
                            if !pacing.is_zero() && !cycle_shutdown_listener.should_shutdown() {
                                std::thread::sleep(pacing);
                            }
                        }
                    }

                    if let Some(teardown_agent_fn) = teardown_agent_fn {
                        if let Err(e) = teardown_agent_fn(&mut context) {
                            log::error!("Teardown failed for {}: {:?}", agent_id, e);
                        }
                    }
                })
                .expect("Failed to spawn thread for virtual user"),
        );
    }

    for handle in handles {
        handle
            .join()
            .map_err(|e| anyhow::anyhow!("Error joining thread for virtual user: {:?}", e))?;
    }

    if let Some(teardown_fn) = definition.teardown_fn {
        // Don't crash the runner if the teardown fails. We still want the reporting to
        // happen cleanly. The hook is documented as 'best effort'.
        if let Err(e) = teardown_fn(runner_context_for_teardown.clone()) {
            log::error!("Teardown failed: {:?}", e);
        }
    }

    Ok(runner_context_for_teardown.reporter().finalize())
}
