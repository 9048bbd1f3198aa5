mod api;
mod client;
mod ids;
mod model;
mod workflow;

pub mod prelude {
    pub use crate::api::{ApiResponse, DealApi};
    pub use crate::client::DealsClient;
    pub use crate::ids::{Clock, DealIdSource, IdScope, SystemClock};
    pub use crate::model::Deal;
    pub use crate::workflow::{DealWorkflow, WorkflowStep};

    // The check and outcome types flow through the workflow's results, so re-export
    // them to save scenarios a direct dependency on the core crate.
    pub use gale_core::prelude::{
        CheckResult, IterationAbort, IterationOutcome, IterationStatus, ResponseSnapshot,
    };
}
