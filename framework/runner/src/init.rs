use clap::Parser;

use crate::cli::GaleScenarioCli;

/// Initialise logging and the CLI for a scenario binary.
pub(crate) fn init() -> GaleScenarioCli {
    env_logger::init();

    GaleScenarioCli::parse()
}
