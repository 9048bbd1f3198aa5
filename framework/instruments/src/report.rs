mod checks_table;
mod operations_table;

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tabled::settings::Style;
use tabled::Table;

use crate::report::checks_table::CheckRow;
use crate::report::operations_table::OperationRow;
use crate::OperationRecord;

/// Selects and configures reporting for a run.
#[derive(Debug, Default)]
pub struct ReportConfig {
    summary: bool,
}

impl ReportConfig {
    /// Print summary tables of operations and checks when the run finishes.
    pub fn enable_summary(mut self) -> Self {
        self.summary = true;
        self
    }

    pub fn init(self) -> Reporter {
        Reporter {
            inner: Mutex::new(InMemory::default()),
            print_summary: self.summary,
        }
    }
}

/// Thread-safe sink for everything the run produces: operation timings, check results
/// and iteration outcomes. Virtual users feed it concurrently; [Reporter::finalize]
/// folds it into the [RunReport] returned to the caller of the scheduler.
#[derive(Debug)]
pub struct Reporter {
    inner: Mutex<InMemory>,
    print_summary: bool,
}

impl Reporter {
    pub fn add_operation(&self, record: OperationRecord) {
        self.inner.lock().operations.push(record);
    }

    pub fn add_check(&self, name: &str, passed: bool) {
        let mut inner = self.inner.lock();
        let tally = inner.checks.entry(name.to_string()).or_default();
        if passed {
            tally.0 += 1;
        } else {
            tally.1 += 1;
        }
    }

    pub fn add_iteration(&self, aborted: bool) {
        let mut inner = self.inner.lock();
        inner.iterations += 1;
        if aborted {
            inner.iterations_aborted += 1;
        }
    }

    pub fn finalize(&self) -> RunReport {
        let inner = self.inner.lock();
        let report = inner.as_report();

        if self.print_summary {
            inner.print_summary(&report);
        }

        report
    }
}

#[derive(Debug, Default)]
struct InMemory {
    operations: Vec<OperationRecord>,
    // check name -> (passed, failed)
    checks: BTreeMap<String, (usize, usize)>,
    iterations: usize,
    iterations_aborted: usize,
}

impl InMemory {
    fn as_report(&self) -> RunReport {
        RunReport {
            iterations: self.iterations,
            iterations_aborted: self.iterations_aborted,
            checks: self
                .checks
                .iter()
                .map(|(name, (passed, failed))| CheckTally {
                    name: name.clone(),
                    passed: *passed,
                    failed: *failed,
                })
                .collect(),
        }
    }

    fn print_summary(&self, report: &RunReport) {
        println!(
            "\n{} iterations run, {} aborted",
            report.iterations, report.iterations_aborted
        );

        if !self.operations.is_empty() {
            let mut grouped: BTreeMap<&str, Vec<&OperationRecord>> = BTreeMap::new();
            for record in &self.operations {
                grouped.entry(record.operation_id()).or_default().push(record);
            }

            let rows = grouped
                .into_iter()
                .map(|(operation_id, records)| OperationRow::summarise(operation_id, &records))
                .collect::<Vec<_>>();

            println!("\nSummary of operations");
            let mut table = Table::new(rows);
            table.with(Style::modern());
            println!("{table}");
        }

        if !report.checks.is_empty() {
            let rows = report
                .checks
                .iter()
                .map(CheckRow::from_tally)
                .collect::<Vec<_>>();

            println!("\nSummary of checks");
            let mut table = Table::new(rows);
            table.with(Style::modern());
            println!("{table}");
        }
    }
}

/// Aggregate result of one whole run, suitable for programmatic assertion.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Iterations started and finished, whether completed or aborted.
    pub iterations: usize,
    /// Iterations that were cut short by a failing check or a transport failure.
    pub iterations_aborted: usize,
    /// Per-check pass/fail tallies across all virtual users, ordered by check name.
    pub checks: Vec<CheckTally>,
}

impl RunReport {
    pub fn check_tally(&self, name: &str) -> Option<&CheckTally> {
        self.checks.iter().find(|tally| tally.name == name)
    }

    pub fn all_checks_passed(&self) -> bool {
        self.checks.iter().all(|tally| tally.failed == 0)
    }
}

#[derive(Debug, Clone)]
pub struct CheckTally {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
}
