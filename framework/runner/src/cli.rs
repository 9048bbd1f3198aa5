use clap::Parser;

/// Command line options accepted by every Gale scenario binary.
///
/// Everything here is optional; scenario-supplied defaults and then built-in defaults
/// apply in that order when a flag is not given.
#[derive(Debug, Parser)]
#[command(about, long_about = None)]
pub struct GaleScenarioCli {
    /// Base URL of the service under test
    #[clap(short, long)]
    pub connection_string: Option<String>,

    /// The number of virtual users to run
    #[clap(long)]
    pub agents: Option<usize>,

    /// The number of seconds to run the scenario for
    #[clap(long)]
    pub duration: Option<u64>,

    /// Delay in milliseconds between one virtual user's iterations
    #[clap(long)]
    pub pacing_ms: Option<u64>,

    /// Run this test as a soak test, ignoring any configured duration and continuing to
    /// run until stopped
    #[clap(long, default_value = "false")]
    pub soak: bool,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being
    /// looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// How to report the results of the run
    #[clap(long, value_enum, default_value = "summary")]
    pub reporter: ReporterOpt,

    /// Identifier for this run, folded into generated data so that consecutive runs
    /// against a persistent target cannot collide. Generated if not set.
    #[clap(long)]
    pub run_id: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ReporterOpt {
    /// Collect in memory and print summary tables at the end of the run
    Summary,
    /// Collect in memory but print nothing
    Noop,
}
