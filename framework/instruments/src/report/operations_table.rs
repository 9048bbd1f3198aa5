use tabled::Tabled;

use crate::OperationRecord;

#[derive(Tabled)]
pub(crate) struct OperationRow {
    #[tabled(rename = "Operation")]
    pub operation_id: String,
    #[tabled(rename = "Calls")]
    pub total_calls: usize,
    #[tabled(rename = "Transport errors")]
    pub transport_errors: usize,
    #[tabled(rename = "Avg (ms)")]
    pub avg_time_ms: f64,
    #[tabled(rename = "Min (ms)")]
    pub min_time_ms: f64,
    #[tabled(rename = "Max (ms)")]
    pub max_time_ms: f64,
}

impl OperationRow {
    pub(crate) fn summarise(operation_id: &str, records: &[&OperationRecord]) -> Self {
        let timed = records
            .iter()
            .filter_map(|record| record.duration())
            .map(|duration| duration.as_micros() as f64 / 1000.0)
            .collect::<Vec<_>>();

        let total_ms = timed.iter().sum::<f64>();

        Self {
            operation_id: operation_id.to_string(),
            total_calls: records.len(),
            transport_errors: records.iter().filter(|record| record.is_error()).count(),
            avg_time_ms: if timed.is_empty() {
                0.0
            } else {
                total_ms / timed.len() as f64
            },
            min_time_ms: if timed.is_empty() {
                0.0
            } else {
                timed.iter().copied().fold(f64::INFINITY, f64::min)
            },
            max_time_ms: timed.iter().copied().fold(0.0, f64::max),
        }
    }
}
