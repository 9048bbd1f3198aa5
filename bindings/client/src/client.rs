use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use gale_instruments::{OperationRecord, Reporter};
use url::Url;

use crate::api::{ApiResponse, DealApi};
use crate::model::Deal;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP adapter for the deal-ingestion service.
///
/// One request per call, no retries. The request timeout bounds how long a virtual user
/// can be held up by an unresponsive target. Every call is timed and fed to the
/// reporter.
#[derive(Debug, Clone)]
pub struct DealsClient {
    inner: reqwest::Client,
    base_url: String,
    reporter: Arc<Reporter>,
}

impl DealsClient {
    pub fn new(base_url: &str, reporter: Arc<Reporter>) -> anyhow::Result<Self> {
        Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;

        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            reporter,
        })
    }

    fn endpoint(&self, segment: &str) -> String {
        if segment.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, segment)
        }
    }

    async fn call(
        &self,
        operation_id: &str,
        request: reqwest::RequestBuilder,
    ) -> anyhow::Result<ApiResponse> {
        let record = OperationRecord::new(operation_id);
        let result = dispatch(request).await;
        self.reporter.add_operation(record.finish(&result));

        result.with_context(|| format!("Transport failure in [{operation_id}]"))
    }
}

async fn dispatch(request: reqwest::RequestBuilder) -> Result<ApiResponse, reqwest::Error> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    // Any status is data for the checks to grade. A missing or malformed body is simply
    // absent; predicates over it then fail, which is the behaviour we want.
    let body = response.json().await.ok();

    Ok(ApiResponse { status, body })
}

#[async_trait]
impl DealApi for DealsClient {
    async fn health(&self) -> anyhow::Result<ApiResponse> {
        self.call("health", self.inner.get(self.endpoint("health")))
            .await
    }

    async fn create(&self, deal: &Deal) -> anyhow::Result<ApiResponse> {
        self.call(
            "create_single",
            self.inner.post(self.endpoint("")).json(deal),
        )
        .await
    }

    async fn create_bulk(&self, deals: &[Deal]) -> anyhow::Result<ApiResponse> {
        self.call(
            "create_bulk",
            self.inner.post(self.endpoint("bulk")).json(deals),
        )
        .await
    }

    async fn list(&self) -> anyhow::Result<ApiResponse> {
        self.call("list_all", self.inner.get(self.endpoint("")))
            .await
    }

    async fn get_by_id(&self, id: &str) -> anyhow::Result<ApiResponse> {
        self.call("read_by_id", self.inner.get(self.endpoint(id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use gale_instruments::ReportConfig;

    use super::*;

    fn client(base_url: &str) -> DealsClient {
        DealsClient::new(base_url, Arc::new(ReportConfig::default().init())).unwrap()
    }

    #[test]
    fn builds_endpoints_under_the_base_url() {
        let client = client("http://localhost:8080/api/deals");

        assert_eq!(client.endpoint(""), "http://localhost:8080/api/deals");
        assert_eq!(
            client.endpoint("health"),
            "http://localhost:8080/api/deals/health"
        );
        assert_eq!(
            client.endpoint("bulk"),
            "http://localhost:8080/api/deals/bulk"
        );
        assert_eq!(
            client.endpoint("K6_SINGLE_1_1700000000000"),
            "http://localhost:8080/api/deals/K6_SINGLE_1_1700000000000"
        );
    }

    #[test]
    fn tolerates_a_trailing_slash_on_the_base_url() {
        let client = client("http://localhost:8080/api/deals/");
        assert_eq!(
            client.endpoint("health"),
            "http://localhost:8080/api/deals/health"
        );
    }

    #[test]
    fn rejects_an_unparseable_base_url() {
        let reporter = Arc::new(ReportConfig::default().init());
        assert!(DealsClient::new("not a url", reporter).is_err());
    }
}
