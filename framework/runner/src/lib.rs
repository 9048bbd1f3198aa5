mod cli;
mod context;
mod definition;
mod executor;
mod init;
mod progress;
mod run;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::cli::{GaleScenarioCli, ReporterOpt};
    pub use crate::context::{AgentContext, RunnerContext, UserValuesConstraint};
    pub use crate::definition::{HookResult, ScenarioDefinitionBuilder};
    pub use crate::run::run;
    pub use crate::types::GaleResult;

    pub use gale_core::prelude::{IterationAbort, ResponseSnapshot};
    pub use gale_instruments::{Reporter, RunReport};
}
