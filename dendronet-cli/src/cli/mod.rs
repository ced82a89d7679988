//! Command-line interface orchestration for dendronet.
//!
//! Both commands load a network from a JSON manifest, apply the threshold,
//! pruning and cluster overrides given on the command line, and summarise the
//! result. `subnet` summarises the neighbourhood of one node instead of the
//! whole network.

mod commands;

pub use commands::{
    Cli, CliError, Command, NetworkArgs, NetworkSummary, SubnetCommand, SummaryCommand,
    ThresholdValue, render_summary, run_cli,
};
