//! Join-all loading of a manifest's resources into a [`Network`].

use std::{path::Path, time::Duration};

use dendronet_core::{Linkage, Network, NetworkBuilder, NetworkError};
use rayon::prelude::*;
use tracing::{Span, debug, field, info, instrument};

use crate::{
    config::LoadConfig,
    errors::LoadError,
    fetch::{AutoFetcher, FsFetcher, HttpFetcher, ResourceFetcher},
    parse::{parse_matrix, parse_strings, parse_vector},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ResourceKind {
    Matrix,
    Linkage,
    NodeData,
    NodeNames,
    NodeOrder,
}

#[derive(Debug)]
struct Request<'a> {
    kind: ResourceKind,
    label: &'a str,
    location: &'a str,
}

/// A parsed resource, tagged with the builder slot it fills.
#[derive(Debug)]
enum Loaded {
    Matrix(Vec<Vec<f64>>),
    Linkage(Vec<Vec<f64>>),
    NodeData(Vec<f64>),
    NodeNames(Vec<String>),
    NodeOrder(Vec<f64>),
}

impl Request<'_> {
    fn load(&self, fetcher: &dyn ResourceFetcher) -> Result<Loaded, LoadError> {
        let text = fetcher.fetch(self.location)?;
        let parsed = match self.kind {
            ResourceKind::Matrix => parse_matrix(&text).map(Loaded::Matrix),
            ResourceKind::Linkage => parse_matrix(&text).map(Loaded::Linkage),
            ResourceKind::NodeData => parse_vector(&text).map(Loaded::NodeData),
            ResourceKind::NodeNames => Ok(Loaded::NodeNames(parse_strings(&text))),
            ResourceKind::NodeOrder => parse_vector(&text).map(Loaded::NodeOrder),
        };
        parsed.map_err(|source| LoadError::Parse {
            location: self.location.to_owned(),
            source,
        })
    }
}

fn requests(config: &LoadConfig) -> Vec<Request<'_>> {
    let mut out = Vec::new();
    push_labelled(
        &mut out,
        ResourceKind::Matrix,
        config.matrix_locations(),
        config.matrix_labels.as_deref(),
    );
    if let Some(location) = &config.linkage {
        out.push(Request {
            kind: ResourceKind::Linkage,
            label: location,
            location,
        });
    }
    push_labelled(
        &mut out,
        ResourceKind::NodeData,
        &config.node_data,
        config.node_data_labels.as_deref(),
    );
    push_labelled(
        &mut out,
        ResourceKind::NodeNames,
        &config.node_names,
        config.node_name_labels.as_deref(),
    );
    push_labelled(
        &mut out,
        ResourceKind::NodeOrder,
        &config.node_orders,
        config.node_order_labels.as_deref(),
    );
    out
}

fn push_labelled<'a>(
    out: &mut Vec<Request<'a>>,
    kind: ResourceKind,
    locations: &'a [String],
    labels: Option<&'a [String]>,
) {
    out.extend(locations.iter().enumerate().map(|(position, location)| Request {
        kind,
        label: labels
            .and_then(|labels| labels.get(position))
            .unwrap_or(location),
        location,
    }));
}

/// Fetches and parses every resource named by `config`, then builds the
/// network.
///
/// Resources are fetched in parallel. The first failure aborts the load and
/// no partial network is produced. The manifest is validated before anything
/// is fetched.
///
/// # Errors
/// Returns [`LoadError::Network`] for manifest or network validation
/// failures, [`LoadError::Fetch`] when a resource cannot be read and
/// [`LoadError::Parse`] when its contents are malformed.
#[instrument(
    name = "providers.load_network",
    err,
    skip(config, fetcher),
    fields(resources = field::Empty),
)]
pub fn load_network(config: &LoadConfig, fetcher: &dyn ResourceFetcher) -> Result<Network, LoadError> {
    config.validate()?;
    let threshold = config
        .threshold
        .as_ref()
        .ok_or(NetworkError::MissingRequiredField { field: "threshold" })?;

    let requests = requests(config);
    Span::current().record("resources", requests.len());
    let loaded = requests
        .par_iter()
        .map(|request| request.load(fetcher))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(resources = loaded.len(), "fetched all resources");

    let mut builder = NetworkBuilder::new()
        .with_threshold_policy(threshold.kind.policy())
        .with_threshold_idx(config.threshold_idx)
        .with_node_order_idx(config.node_order_idx)
        .with_node_name_idx(config.node_name_idx)
        .with_num_clusters(config.num_clusters)
        .with_pruning(config.pruning);
    if let Some(name) = &config.name {
        builder = builder.with_name(name.as_str());
    }
    if let Some(params) = &threshold.params {
        builder = builder.with_threshold_params(params.clone());
    }
    if let Some(labels) = &threshold.param_labels {
        builder = builder.with_threshold_param_labels(labels.clone());
    }
    if let Some(base) = &config.thumbnails {
        builder = builder.with_thumbnails(base.as_str());
    }
    for (request, data) in requests.iter().zip(loaded) {
        builder = match data {
            Loaded::Matrix(rows) => builder.with_matrix(request.label, rows),
            Loaded::Linkage(rows) => builder.with_linkage(Linkage::try_from_rows(rows)?),
            Loaded::NodeData(values) => builder.with_node_data(request.label, values),
            Loaded::NodeNames(names) => builder.with_node_names(request.label, names),
            Loaded::NodeOrder(values) => builder.with_node_order(request.label, values),
        };
    }

    let network = builder.build()?;
    info!(
        network = %network.name(),
        nodes = network.node_count(),
        edges = network.edges().len(),
        "network loaded"
    );
    Ok(network)
}

/// Reads the manifest at `path` and loads the network it describes.
///
/// Relative locations resolve against the manifest's directory; `http://` and
/// `https://` locations are downloaded with `http_timeout`. The network is
/// named after the manifest's file stem unless the manifest names it.
///
/// # Errors
/// Returns [`LoadError::Fetch`] when the manifest cannot be read, otherwise
/// as [`load_network`].
#[instrument(
    name = "providers.load_manifest",
    err,
    skip(path),
    fields(path = %path.as_ref().display()),
)]
pub fn load_manifest(path: impl AsRef<Path>, http_timeout: Duration) -> Result<Network, LoadError> {
    let path = path.as_ref();
    let location = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|err| LoadError::fetch(&location, &err))?;
    let mut config = LoadConfig::from_json(&text)?;
    if config.name.is_none() {
        config.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }
    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let fetcher = AutoFetcher::new(FsFetcher::open(base)?, HttpFetcher::new(http_timeout));
    load_network(&config, &fetcher)
}
