use std::future::Future;

use gale_core::prelude::{
    evaluate, require_all, CheckResult, IterationAbort, IterationOutcome,
};

use crate::api::{ApiResponse, DealApi};
use crate::ids::{DealIdSource, IdScope};
use crate::model::Deal;

/// The five workflow steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Health,
    SingleCreate,
    BulkCreate,
    ListAll,
    ReadById,
}

impl WorkflowStep {
    pub fn name(self) -> &'static str {
        match self {
            WorkflowStep::Health => "health",
            WorkflowStep::SingleCreate => "single-create",
            WorkflowStep::BulkCreate => "bulk-create",
            WorkflowStep::ListAll => "list-all",
            WorkflowStep::ReadById => "read-by-id",
        }
    }
}

const SINGLE_KIND: &str = "SINGLE";
const BULK_KIND: &str = "BULK";

// Fixture payload values; the target's business validation is not under test here.
const SINGLE_FIXTURE: (&str, &str, f64) = ("USD", "EUR", 999.0);
const BULK_FIXTURES: [(&str, &str, f64); 2] = [("USD", "EUR", 100.0), ("GBP", "USD", 200.0)];
const FIXTURE_TIMESTAMP: &str = "2024-01-01T10:00:00";

/// Executes complete iterations of the deal-ingestion workflow for one virtual user.
///
/// An iteration is the fixed sequence health → single-create → bulk-create → list-all →
/// read-by-id, each step gated on its checks. The first failing step aborts the rest of
/// the iteration; the outcome still carries every check that was graded before the
/// abort.
pub struct DealWorkflow<'a> {
    api: &'a dyn DealApi,
    ids: &'a DealIdSource,
    vu_index: usize,
}

impl<'a> DealWorkflow<'a> {
    pub fn new(api: &'a dyn DealApi, ids: &'a DealIdSource, vu_index: usize) -> Self {
        Self { api, ids, vu_index }
    }

    /// One full pass of the workflow.
    pub async fn run_once(&self) -> IterationOutcome {
        let mut checks = Vec::new();
        match self.drive(&mut checks).await {
            Ok(()) => IterationOutcome::completed(checks),
            Err(abort) => IterationOutcome::aborted(checks, abort),
        }
    }

    async fn drive(&self, checks: &mut Vec<CheckResult>) -> Result<(), IterationAbort> {
        self.health(checks).await?;
        let id = self.single_create(checks).await?;
        self.bulk_create(checks).await?;
        self.list_all(checks).await?;
        self.read_by_id(checks, &id).await?;
        Ok(())
    }

    async fn health(&self, checks: &mut Vec<CheckResult>) -> Result<(), IterationAbort> {
        let step = WorkflowStep::Health;
        let response = call(step, self.api.health()).await?;

        let gated = gate(
            step,
            checks,
            vec![evaluate("health status is 200", &response, |r| {
                r.is_status(200)
            })],
        );
        if gated.is_err() {
            // Distinctly severe: the target is not reachable at all for this iteration.
            log::warn!("Health check failed, target unusable for this iteration");
        }

        gated
    }

    async fn single_create(&self, checks: &mut Vec<CheckResult>) -> Result<String, IterationAbort> {
        let step = WorkflowStep::SingleCreate;
        let id = self.ids.next(IdScope {
            kind: SINGLE_KIND,
            vu_index: self.vu_index,
            sub_index: None,
        });

        let (from, to, amount) = SINGLE_FIXTURE;
        let deal = Deal::new(&id, from, to, amount).with_timestamp(FIXTURE_TIMESTAMP);
        let response = call(step, self.api.create(&deal)).await?;

        gate(
            step,
            checks,
            vec![evaluate("single create status is 201", &response, |r| {
                r.is_status(201)
            })],
        )?;

        // Retained for the read-by-id step.
        Ok(id)
    }

    async fn bulk_create(&self, checks: &mut Vec<CheckResult>) -> Result<(), IterationAbort> {
        let step = WorkflowStep::BulkCreate;
        let deals = BULK_FIXTURES
            .iter()
            .copied()
            .zip(1u32..)
            .map(|((from, to, amount), sub_index)| {
                let id = self.ids.next(IdScope {
                    kind: BULK_KIND,
                    vu_index: self.vu_index,
                    sub_index: Some(sub_index),
                });
                Deal::new(id, from, to, amount).with_timestamp(FIXTURE_TIMESTAMP)
            })
            .collect::<Vec<_>>();

        // The whole batch gets a single response.
        let response = call(step, self.api.create_bulk(&deals)).await?;

        gate(
            step,
            checks,
            vec![evaluate("bulk create status is 201", &response, |r| {
                r.is_status(201)
            })],
        )
    }

    async fn list_all(&self, checks: &mut Vec<CheckResult>) -> Result<(), IterationAbort> {
        let step = WorkflowStep::ListAll;
        let response = call(step, self.api.list()).await?;

        gate(
            step,
            checks,
            vec![
                evaluate("list all status is 200", &response, |r| r.is_status(200)),
                // A minimum, not an exact count. Concurrent virtual users insert deals
                // at unspecified interleavings, so this iteration's writes cannot be
                // singled out in the collection.
                evaluate("list all returns at least one deal", &response, |r| {
                    r.array_len().is_some_and(|len| len >= 1)
                }),
            ],
        )
    }

    async fn read_by_id(
        &self,
        checks: &mut Vec<CheckResult>,
        id: &str,
    ) -> Result<(), IterationAbort> {
        let step = WorkflowStep::ReadById;
        let response = call(step, self.api.get_by_id(id)).await?;

        gate(
            step,
            checks,
            vec![
                evaluate("read by id status is 200", &response, |r| r.is_status(200)),
                evaluate("read by id returns the created deal", &response, |r| {
                    r.str_field("dealUniqueId") == Some(id)
                }),
            ],
        )
    }
}

/// A transport failure at any step is an automatic abort of the iteration.
async fn call(
    step: WorkflowStep,
    fut: impl Future<Output = anyhow::Result<ApiResponse>>,
) -> Result<ApiResponse, IterationAbort> {
    fut.await
        .map_err(|error| IterationAbort::transport(step.name(), format!("{error:#}")))
}

fn gate(
    step: WorkflowStep,
    all: &mut Vec<CheckResult>,
    graded: Vec<CheckResult>,
) -> Result<(), IterationAbort> {
    let result = require_all(step.name(), &graded);
    all.extend(graded);
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use gale_core::prelude::IterationStatus;
    use serde_json::json;

    use super::*;
    use crate::api::ApiResponse;

    /// Scripted stand-in for the target service. Records the calls it receives and
    /// answers with configured statuses; read-by-id echoes the requested id unless told
    /// to misbehave.
    struct ScriptedApi {
        calls: Mutex<Vec<String>>,
        health_status: u16,
        single_status: u16,
        bulk_status: u16,
        list_body: Option<serde_json::Value>,
        echo_read_id: bool,
        health_unreachable: bool,
    }

    impl ScriptedApi {
        fn well_behaved() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                health_status: 200,
                single_status: 201,
                bulk_status: 201,
                list_body: Some(json!([{"dealUniqueId": "existing"}])),
                echo_read_id: true,
                health_unreachable: false,
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DealApi for ScriptedApi {
        async fn health(&self) -> anyhow::Result<ApiResponse> {
            self.record("health");
            if self.health_unreachable {
                anyhow::bail!("connection refused");
            }
            Ok(ApiResponse::with_status(self.health_status))
        }

        async fn create(&self, deal: &Deal) -> anyhow::Result<ApiResponse> {
            self.record(format!("create:{}", deal.deal_unique_id));
            Ok(ApiResponse::with_status(self.single_status))
        }

        async fn create_bulk(&self, deals: &[Deal]) -> anyhow::Result<ApiResponse> {
            self.record(format!("bulk:{}", deals.len()));
            Ok(ApiResponse::with_status(self.bulk_status))
        }

        async fn list(&self) -> anyhow::Result<ApiResponse> {
            self.record("list");
            Ok(ApiResponse {
                status: 200,
                body: self.list_body.clone(),
            })
        }

        async fn get_by_id(&self, id: &str) -> anyhow::Result<ApiResponse> {
            self.record(format!("get:{id}"));
            if self.echo_read_id {
                Ok(ApiResponse::with_body(200, json!({"dealUniqueId": id})))
            } else {
                Ok(ApiResponse::with_body(
                    200,
                    json!({"dealUniqueId": "someone-elses-deal"}),
                ))
            }
        }
    }

    fn ids() -> DealIdSource {
        #[derive(Debug)]
        struct FrozenClock;
        impl crate::ids::Clock for FrozenClock {
            fn now_millis(&self) -> u64 {
                1700000000000
            }
        }
        DealIdSource::new("RUN", std::sync::Arc::new(FrozenClock))
    }

    #[tokio::test]
    async fn a_clean_pass_completes_with_all_checks_green() {
        let api = ScriptedApi::well_behaved();
        let ids = ids();
        let workflow = DealWorkflow::new(&api, &ids, 7);

        let outcome = workflow.run_once().await;

        assert!(!outcome.is_aborted());
        assert_eq!(outcome.checks().len(), 7);
        assert!(outcome.checks().iter().all(|check| check.passed()));

        // Steps ran in order, and read-by-id fetched exactly the id single-create made.
        assert_eq!(
            api.calls(),
            vec![
                "health",
                "create:RUN_SINGLE_7_1700000000000",
                "bulk:2",
                "list",
                "get:RUN_SINGLE_7_1700000000000",
            ]
        );
    }

    #[tokio::test]
    async fn failed_single_create_short_circuits_the_remaining_steps() {
        let api = ScriptedApi {
            single_status: 400,
            ..ScriptedApi::well_behaved()
        };
        let ids = ids();
        let workflow = DealWorkflow::new(&api, &ids, 0);

        let outcome = workflow.run_once().await;

        match outcome.status() {
            IterationStatus::Aborted(abort) => {
                assert_eq!(abort.step(), "single-create");
                assert!(abort.reason().contains("single create status is 201"));
                // The diagnostic names the status the target answered with.
                assert!(abort.reason().contains("observed status 400"));
            }
            other => panic!("expected abort, got {:?}", other),
        }

        // Bulk-create, list-all and read-by-id were never invoked.
        assert_eq!(api.calls().len(), 2);
        assert_eq!(api.calls()[0], "health");
        assert!(api.calls()[1].starts_with("create:"));

        // Both graded checks survive in the outcome: the passing health check and the
        // failing create check.
        assert_eq!(outcome.checks().len(), 2);
        assert!(outcome.checks()[0].passed());
        assert!(!outcome.checks()[1].passed());
    }

    #[tokio::test]
    async fn unreachable_target_aborts_at_health_with_no_checks() {
        let api = ScriptedApi {
            health_unreachable: true,
            ..ScriptedApi::well_behaved()
        };
        let ids = ids();
        let workflow = DealWorkflow::new(&api, &ids, 0);

        let outcome = workflow.run_once().await;

        match outcome.status() {
            IterationStatus::Aborted(abort) => {
                assert_eq!(abort.step(), "health");
                assert!(abort.reason().contains("transport failure"));
            }
            other => panic!("expected abort, got {:?}", other),
        }
        assert!(outcome.checks().is_empty());
        assert_eq!(api.calls(), vec!["health"]);
    }

    #[tokio::test]
    async fn empty_collection_fails_the_list_minimum() {
        let api = ScriptedApi {
            list_body: Some(json!([])),
            ..ScriptedApi::well_behaved()
        };
        let ids = ids();
        let workflow = DealWorkflow::new(&api, &ids, 0);

        let outcome = workflow.run_once().await;

        match outcome.status() {
            IterationStatus::Aborted(abort) => {
                assert_eq!(abort.step(), "list-all");
                assert!(abort.reason().contains("at least one deal"));
            }
            other => panic!("expected abort, got {:?}", other),
        }

        // The status check on the same response still passed and was kept.
        let list_status = outcome
            .checks()
            .iter()
            .find(|check| check.name() == "list all status is 200")
            .unwrap();
        assert!(list_status.passed());
    }

    #[tokio::test]
    async fn non_array_list_body_fails_the_minimum_rather_than_crashing() {
        let api = ScriptedApi {
            list_body: Some(json!({"unexpected": "shape"})),
            ..ScriptedApi::well_behaved()
        };
        let ids = ids();
        let workflow = DealWorkflow::new(&api, &ids, 0);

        let outcome = workflow.run_once().await;

        assert!(outcome.is_aborted());
    }

    #[tokio::test]
    async fn wrong_deal_returned_fails_the_round_trip_check() {
        let api = ScriptedApi {
            echo_read_id: false,
            ..ScriptedApi::well_behaved()
        };
        let ids = ids();
        let workflow = DealWorkflow::new(&api, &ids, 0);

        let outcome = workflow.run_once().await;

        match outcome.status() {
            IterationStatus::Aborted(abort) => {
                assert_eq!(abort.step(), "read-by-id");
                assert!(abort.reason().contains("returns the created deal"));
            }
            other => panic!("expected abort, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bulk_create_submits_two_deals_for_one_response() {
        let api = ScriptedApi::well_behaved();
        let ids = ids();
        let workflow = DealWorkflow::new(&api, &ids, 3);

        workflow.run_once().await;

        // A single bulk call carrying both payloads; the batch shares the timestamp but
        // each item has its own sub-indexed id.
        let calls = api.calls();
        assert_eq!(
            calls.iter().filter(|call| call.starts_with("bulk:")).count(),
            1
        );
        assert!(calls.contains(&"bulk:2".to_string()));
    }
}
