//! Command implementations and argument parsing for the dendronet CLI.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use dendronet_core::{Network, NetworkError, WeightRange};
use dendronet_providers_text::{DEFAULT_HTTP_TIMEOUT, LoadError, load_manifest};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "dendronet", about = "Load and summarise connectivity networks.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the thresholded network and its clusters.
    Summary(SummaryCommand),
    /// Print the sub-network formed by one node and its neighbours.
    Subnet(SubnetCommand),
}

/// Options shared by every command: where to load from and how to derive
/// edges and clusters.
#[derive(Debug, Args, Clone)]
pub struct NetworkArgs {
    /// Path to the JSON load manifest.
    pub manifest: PathBuf,

    /// Matrix used for thresholding.
    #[arg(long = "threshold-idx")]
    pub threshold_idx: Option<usize>,

    /// Threshold parameter override, as `IDX=VALUE`. May be repeated.
    #[arg(long = "threshold-value", value_name = "IDX=VALUE")]
    pub threshold_values: Vec<ThresholdValue>,

    /// Number of flat clusters.
    #[arg(long)]
    pub clusters: Option<usize>,

    /// Remove disconnected nodes from the tree.
    #[arg(long)]
    pub prune: bool,

    /// Timeout in seconds for resources fetched over HTTP.
    #[arg(long = "http-timeout", default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub http_timeout_secs: u64,
}

/// Options accepted by the `summary` command.
#[derive(Debug, Args, Clone)]
pub struct SummaryCommand {
    /// Network options.
    #[command(flatten)]
    pub network: NetworkArgs,
}

/// Options accepted by the `subnet` command.
#[derive(Debug, Args, Clone)]
pub struct SubnetCommand {
    /// Network options.
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Zero-based index of the sub-network's root node.
    #[arg(long)]
    pub node: usize,
}

/// A `--threshold-value` override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdValue {
    /// Index of the threshold parameter.
    pub param: usize,
    /// New parameter value.
    pub value: f64,
}

impl FromStr for ThresholdValue {
    type Err = CliError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| CliError::InvalidArgument {
            argument: "--threshold-value",
            message: format!("`{raw}`: {message}"),
        };
        let (param, value) = raw
            .split_once('=')
            .ok_or_else(|| invalid("expected IDX=VALUE"))?;
        let param = param
            .trim()
            .parse()
            .map_err(|_| invalid("parameter index is not a non-negative integer"))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| invalid("value is not a number"))?;
        if value.is_nan() {
            return Err(invalid("value is NaN"));
        }
        Ok(Self { param, value })
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The manifest path could not be resolved.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Loading the network failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Applying an option to the network failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// A command-line value was malformed.
    #[error("invalid {argument}: {message}")]
    InvalidArgument {
        /// Flag that carried the value.
        argument: &'static str,
        /// Description of the defect.
        message: String,
    },
}

impl CliError {
    /// Return the stable machine-readable code of this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CLI_IO",
            Self::Load(err) => err.code().as_str(),
            Self::Network(err) => err.code().as_str(),
            Self::InvalidArgument { .. } => "CLI_INVALID_ARGUMENT",
        }
    }
}

/// Plain-data view of a network, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    /// Network name.
    pub name: String,
    /// Number of nodes.
    pub nodes: usize,
    /// Number of edges that survived thresholding.
    pub edges: usize,
    /// Threshold policy identifier.
    pub policy: String,
    /// Label of the thresholded matrix.
    pub threshold_matrix: String,
    /// Threshold parameters as `(label, value)`.
    pub threshold_params: Vec<(String, f64)>,
    /// Whether pruning is enabled.
    pub pruning: bool,
    /// Member names of each flat cluster.
    pub clusters: Vec<Vec<String>>,
    /// Names of nodes removed from the tree.
    pub pruned: Vec<String>,
    /// Weight statistics per matrix, as `(label, range)`.
    pub weights: Vec<(String, Option<WeightRange>)>,
}

impl NetworkSummary {
    /// Captures the current state of `network`.
    #[must_use]
    pub fn of(network: &Network) -> Self {
        let name_of = |node: usize| network.node_name(node).unwrap_or_else(|| node.to_string());
        Self {
            name: network.name().to_owned(),
            nodes: network.node_count(),
            edges: network.edges().len(),
            policy: network.policy().name().to_owned(),
            threshold_matrix: network
                .matrix_labels()
                .nth(network.threshold_idx())
                .unwrap_or_default()
                .to_owned(),
            threshold_params: network
                .threshold_param_labels()
                .iter()
                .cloned()
                .zip(network.threshold_params().iter().copied())
                .collect(),
            pruning: network.pruning(),
            clusters: network
                .clusters()
                .into_iter()
                .map(|cluster| cluster.members.into_iter().map(name_of).collect())
                .collect(),
            pruned: (0..network.node_count())
                .filter(|&node| network.parent_of(node).is_none())
                .map(name_of)
                .collect(),
            weights: network
                .matrix_labels()
                .map(str::to_owned)
                .zip(network.weight_stats().iter().copied())
                .collect(),
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the network or applying an option fails.
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<NetworkSummary, CliError> {
    match cli.command {
        Command::Summary(summary) => {
            Span::current().record("command", field::display("summary"));
            run_summary(&summary)
        }
        Command::Subnet(subnet) => {
            Span::current().record("command", field::display("subnet"));
            run_subnet(&subnet)
        }
    }
}

pub(super) fn run_summary(command: &SummaryCommand) -> Result<NetworkSummary, CliError> {
    let network = open_network(&command.network)?;
    let summary = NetworkSummary::of(&network);
    info!(
        network = summary.name.as_str(),
        clusters = summary.clusters.len(),
        "summary completed"
    );
    Ok(summary)
}

#[instrument(name = "cli.subnet", err, skip(command), fields(node = command.node))]
pub(super) fn run_subnet(command: &SubnetCommand) -> Result<NetworkSummary, CliError> {
    let network = open_network(&command.network)?;
    let sub = network.extract_sub_network(command.node)?;
    let summary = NetworkSummary::of(&sub);
    info!(
        network = summary.name.as_str(),
        nodes = summary.nodes,
        "sub-network extracted"
    );
    Ok(summary)
}

/// Loads the manifest named by `args` and applies the command-line
/// overrides.
#[instrument(
    name = "cli.open_network",
    err,
    skip(args),
    fields(path = field::Empty),
)]
pub(super) fn open_network(args: &NetworkArgs) -> Result<Network, CliError> {
    let path = fs::canonicalize(&args.manifest).map_err(|source| CliError::Io {
        path: args.manifest.clone(),
        source,
    })?;
    Span::current().record("path", field::display(path.display()));
    let mut network = load_manifest(&path, Duration::from_secs(args.http_timeout_secs))?;
    apply_overrides(&mut network, args)?;
    Ok(network)
}

pub(super) fn apply_overrides(network: &mut Network, args: &NetworkArgs) -> Result<(), CliError> {
    if let Some(idx) = args.threshold_idx {
        network.set_threshold_idx(idx)?;
    }
    for override_value in &args.threshold_values {
        network.set_threshold_value(override_value.param, override_value.value)?;
    }
    if args.prune {
        network.set_pruning_state(true)?;
    }
    if let Some(clusters) = args.clusters {
        network.set_num_clusters(clusters)?;
    }
    Ok(())
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use dendronet_cli::cli::{NetworkSummary, render_summary};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = NetworkSummary {
///     name: "demo".into(),
///     nodes: 2,
///     edges: 1,
///     policy: "absolute".into(),
///     threshold_matrix: "strength".into(),
///     threshold_params: vec![("cutoff".into(), 0.5)],
///     pruning: false,
///     clusters: vec![vec!["1".into(), "2".into()]],
///     pruned: Vec::new(),
///     weights: vec![("strength".into(), None)],
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert!(text.contains("cluster 1: 1 2"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &NetworkSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "network: {}", summary.name)?;
    writeln!(writer, "nodes: {}", summary.nodes)?;
    writeln!(writer, "edges: {}", summary.edges)?;
    write!(
        writer,
        "threshold: {} on `{}`",
        summary.policy, summary.threshold_matrix
    )?;
    for (label, value) in &summary.threshold_params {
        write!(writer, " [{label}={value}]")?;
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "pruning: {}",
        if summary.pruning { "on" } else { "off" }
    )?;
    writeln!(writer, "clusters: {}", summary.clusters.len())?;
    for (index, members) in summary.clusters.iter().enumerate() {
        writeln!(writer, "cluster {}: {}", index + 1, members.join(" "))?;
    }
    if !summary.pruned.is_empty() {
        writeln!(writer, "pruned: {}", summary.pruned.join(" "))?;
    }
    for (label, range) in &summary.weights {
        match range {
            Some(range) => writeln!(
                writer,
                "weights `{label}`: min {} max {}",
                range.min, range.max
            )?,
            None => writeln!(writer, "weights `{label}`: no edges")?,
        }
    }
    Ok(())
}
