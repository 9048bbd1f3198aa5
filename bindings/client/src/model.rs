use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The timestamp rendering the ingestion API accepts, ISO-8601 without an offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A currency exchange deal as exchanged with the ingestion API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// Globally unique per test run; the API rejects duplicates.
    pub deal_unique_id: String,
    pub from_currency_iso_code: String,
    pub to_currency_iso_code: String,
    pub deal_timestamp: String,
    pub deal_amount: f64,
}

impl Deal {
    /// Build a deal with the given id and currency pair, stamped with the current time.
    pub fn new(id: impl Into<String>, from: &str, to: &str, amount: f64) -> Self {
        Self {
            deal_unique_id: id.into(),
            from_currency_iso_code: from.to_string(),
            to_currency_iso_code: to.to_string(),
            deal_timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            deal_amount: amount,
        }
    }

    /// Replace the timestamp, for payloads that use a fixture time instead of now.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.deal_timestamp = timestamp.into();
        self
    }
}
