use tabled::Tabled;

use crate::report::CheckTally;

#[derive(Tabled)]
pub(crate) struct CheckRow {
    #[tabled(rename = "Check")]
    pub name: String,
    #[tabled(rename = "Passed")]
    pub passed: usize,
    #[tabled(rename = "Failed")]
    pub failed: usize,
}

impl CheckRow {
    pub(crate) fn from_tally(tally: &CheckTally) -> Self {
        Self {
            name: tally.name.clone(),
            passed: tally.passed,
            failed: tally.failed,
        }
    }
}
