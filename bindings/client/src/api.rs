use async_trait::async_trait;
use gale_core::prelude::{CheckSubject, ResponseSnapshot};
use serde_json::Value;

use crate::model::Deal;

/// Status and parsed body captured from one response of the target service.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` when the response had no body or the body was not valid JSON.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn with_status(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn with_body(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn is_status(&self, expected: u16) -> bool {
        self.status == expected
    }

    /// Length of the body when it is a JSON array.
    pub fn array_len(&self) -> Option<usize> {
        self.body
            .as_ref()
            .and_then(|body| body.as_array())
            .map(|array| array.len())
    }

    /// A top-level string field of the body when it is a JSON object.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get(name))
            .and_then(|value| value.as_str())
    }
}

impl CheckSubject for ApiResponse {
    fn snapshot(&self) -> ResponseSnapshot {
        match &self.body {
            Some(body) => ResponseSnapshot::with_body(self.status, body.to_string()),
            None => ResponseSnapshot::of_status(self.status),
        }
    }
}

/// The calls the workflow makes against the deal-ingestion service.
///
/// Transport failures are `Err`. Any HTTP status, success or not, is a normal `Ok`
/// response for the checks to grade. Implementations must issue exactly one request per
/// call and never retry.
#[async_trait]
pub trait DealApi: Send + Sync {
    async fn health(&self) -> anyhow::Result<ApiResponse>;

    async fn create(&self, deal: &Deal) -> anyhow::Result<ApiResponse>;

    async fn create_bulk(&self, deals: &[Deal]) -> anyhow::Result<ApiResponse>;

    async fn list(&self) -> anyhow::Result<ApiResponse>;

    async fn get_by_id(&self, id: &str) -> anyhow::Result<ApiResponse>;
}
