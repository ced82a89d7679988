//! Builder for validated [`Network`] instances.
//!
//! Collects parsed matrices and per-node arrays, checks every shape against
//! the node count of the first matrix, and derives edges and the dendrogram
//! before handing back a [`Network`].

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    Result,
    dendrogram::Linkage,
    error::{ArrayId, ArrayKind, NetworkError},
    matrix::Matrix,
    network::{Labelled, Network, NetworkParts},
    scale::ScaleConfig,
    threshold::ThresholdPolicy,
};

const DEFAULT_NAME: &str = "network";

/// Configures and constructs [`Network`] instances.
///
/// Only the matrices and the threshold policy are required. Everything else
/// falls back to a default: threshold index 0, the policy's default
/// parameters, one cluster, pruning disabled, index-based node names and
/// dendrogram display order.
///
/// # Examples
/// ```
/// use dendronet_core::{AbsoluteCutoff, NetworkBuilder};
/// use std::sync::Arc;
///
/// let network = NetworkBuilder::new()
///     .with_matrix(
///         "weights",
///         vec![vec![0.0, 0.9, 0.2], vec![0.9, 0.0, 0.1], vec![0.2, 0.1, 0.0]],
///     )
///     .with_threshold_policy(Arc::new(AbsoluteCutoff))
///     .with_threshold_params(vec![0.5])
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(network.node_count(), 3);
/// assert_eq!(network.edges().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct NetworkBuilder {
    name: Arc<str>,
    matrices: Vec<Labelled<Vec<Vec<f64>>>>,
    linkage: Option<Linkage>,
    node_data: Vec<Labelled<Vec<f64>>>,
    node_names: Vec<Labelled<Vec<String>>>,
    node_orders: Vec<Labelled<Vec<f64>>>,
    thumbnails: Option<Arc<str>>,
    policy: Option<Arc<dyn ThresholdPolicy>>,
    threshold_params: Option<Vec<f64>>,
    threshold_param_labels: Option<Vec<String>>,
    threshold_idx: usize,
    node_order_idx: Option<usize>,
    node_name_idx: Option<usize>,
    num_clusters: usize,
    pruning: bool,
    scale: Option<Arc<ScaleConfig>>,
    full_net_indices: Option<Vec<usize>>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self {
            name: Arc::from(DEFAULT_NAME),
            matrices: Vec::new(),
            linkage: None,
            node_data: Vec::new(),
            node_names: Vec::new(),
            node_orders: Vec::new(),
            thumbnails: None,
            policy: None,
            threshold_params: None,
            threshold_param_labels: None,
            threshold_idx: 0,
            node_order_idx: None,
            node_name_idx: None,
            num_clusters: 1,
            pruning: false,
            scale: None,
            full_net_indices: None,
        }
    }
}

impl NetworkBuilder {
    /// Creates a builder populated with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name used in diagnostics.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Appends a connectivity matrix given as parsed rows.
    ///
    /// The first matrix fixes the node count.
    #[must_use]
    pub fn with_matrix(mut self, label: impl Into<Arc<str>>, rows: Vec<Vec<f64>>) -> Self {
        self.matrices.push(Labelled::new(label, rows));
        self
    }

    /// Supplies the hierarchical-clustering linkage table.
    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = Some(linkage);
        self
    }

    /// Appends a scalar node-data array.
    #[must_use]
    pub fn with_node_data(mut self, label: impl Into<Arc<str>>, values: Vec<f64>) -> Self {
        self.node_data.push(Labelled::new(label, values));
        self
    }

    /// Appends a node-name array.
    #[must_use]
    pub fn with_node_names(mut self, label: impl Into<Arc<str>>, names: Vec<String>) -> Self {
        self.node_names.push(Labelled::new(label, names));
        self
    }

    /// Appends a node display-order array. Nodes are displayed by ascending
    /// value.
    #[must_use]
    pub fn with_node_order(mut self, label: impl Into<Arc<str>>, values: Vec<f64>) -> Self {
        self.node_orders.push(Labelled::new(label, values));
        self
    }

    /// Sets the base path thumbnails are resolved against.
    #[must_use]
    pub fn with_thumbnails(mut self, base: impl Into<Arc<str>>) -> Self {
        self.thumbnails = Some(base.into());
        self
    }

    /// Sets the policy deciding which entries become edges.
    #[must_use]
    pub fn with_threshold_policy(mut self, policy: Arc<dyn ThresholdPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Overrides the policy's default parameters.
    #[must_use]
    pub fn with_threshold_params(mut self, params: Vec<f64>) -> Self {
        self.threshold_params = Some(params);
        self
    }

    /// Overrides the policy's parameter labels.
    #[must_use]
    pub fn with_threshold_param_labels(mut self, labels: Vec<String>) -> Self {
        self.threshold_param_labels = Some(labels);
        self
    }

    /// Selects which matrix is thresholded.
    #[must_use]
    pub fn with_threshold_idx(mut self, idx: usize) -> Self {
        self.threshold_idx = idx;
        self
    }

    /// Selects the display-order array; `None` uses dendrogram order.
    #[must_use]
    pub fn with_node_order_idx(mut self, idx: Option<usize>) -> Self {
        self.node_order_idx = idx;
        self
    }

    /// Selects the node-name array; `None` names nodes by 1-based index.
    #[must_use]
    pub fn with_node_name_idx(mut self, idx: Option<usize>) -> Self {
        self.node_name_idx = idx;
        self
    }

    /// Sets the number of flat clusters the dendrogram is cut into.
    #[must_use]
    pub fn with_num_clusters(mut self, clusters: usize) -> Self {
        self.num_clusters = clusters;
        self
    }

    /// Enables or disables pruning of disconnected nodes.
    #[must_use]
    pub fn with_pruning(mut self, enabled: bool) -> Self {
        self.pruning = enabled;
        self
    }

    pub(crate) fn with_scale_config(mut self, scale: Arc<ScaleConfig>) -> Self {
        self.scale = Some(scale);
        self
    }

    pub(crate) fn with_full_net_indices(mut self, indices: Vec<usize>) -> Self {
        self.full_net_indices = Some(indices);
        self
    }

    /// Validates the configuration and constructs a [`Network`].
    ///
    /// # Errors
    /// Returns [`NetworkError::MissingRequiredField`] when no matrix or no
    /// threshold policy was supplied, [`NetworkError::EmptyNetwork`] when the
    /// first matrix has no rows, [`NetworkError::ShapeMismatch`] when a matrix
    /// or per-node array disagrees with the node count,
    /// [`NetworkError::LengthMismatch`] when threshold parameters and labels
    /// differ in length, [`NetworkError::IndexOutOfRange`] for an invalid
    /// initial selection, and [`NetworkError::MalformedLinkage`] when the
    /// linkage cannot be resolved.
    #[instrument(
        name = "core.build_network",
        err,
        skip(self),
        fields(network = %self.name, matrices = self.matrices.len()),
    )]
    pub fn build(self) -> Result<Network> {
        let policy = self
            .policy
            .ok_or(NetworkError::MissingRequiredField {
                field: "threshold policy",
            })?;
        let Some(first) = self.matrices.first() else {
            return Err(NetworkError::MissingRequiredField { field: "matrices" });
        };
        let node_count = first.values.len();
        if node_count == 0 {
            return Err(NetworkError::EmptyNetwork {
                network: Arc::clone(&self.name),
            });
        }

        let matrices = self
            .matrices
            .into_iter()
            .enumerate()
            .map(|(position, matrix)| square(position, matrix, node_count))
            .collect::<Result<Vec<_>>>()?;
        check_lengths(ArrayKind::NodeData, &self.node_data, node_count)?;
        check_lengths(ArrayKind::NodeNames, &self.node_names, node_count)?;
        check_lengths(ArrayKind::NodeOrder, &self.node_orders, node_count)?;

        let threshold_params = self
            .threshold_params
            .unwrap_or_else(|| policy.default_params());
        let threshold_param_labels = self
            .threshold_param_labels
            .unwrap_or_else(|| policy.param_labels());
        if threshold_param_labels.len() != threshold_params.len() {
            return Err(NetworkError::LengthMismatch {
                what: "threshold parameter labels",
                expected: threshold_params.len(),
                actual: threshold_param_labels.len(),
            });
        }

        check_index("threshold", Some(self.threshold_idx), matrices.len())?;
        check_index("node order", self.node_order_idx, self.node_orders.len())?;
        check_index("node name", self.node_name_idx, self.node_names.len())?;
        if let Some(indices) = &self.full_net_indices {
            if indices.len() != node_count {
                return Err(NetworkError::LengthMismatch {
                    what: "full network indices",
                    expected: node_count,
                    actual: indices.len(),
                });
            }
        }

        debug!(
            network = %self.name,
            nodes = node_count,
            policy = policy.name(),
            "validated network inputs"
        );
        Network::assemble(NetworkParts {
            name: self.name,
            node_count,
            matrices,
            linkage: self.linkage,
            node_data: self.node_data,
            node_names: self.node_names,
            node_orders: self.node_orders,
            thumbnails: self.thumbnails,
            policy,
            threshold_params,
            threshold_param_labels,
            threshold_idx: self.threshold_idx,
            node_order_idx: self.node_order_idx,
            node_name_idx: self.node_name_idx,
            num_clusters: self.num_clusters,
            pruning: self.pruning,
            scale: self.scale,
            full_net_indices: self.full_net_indices,
        })
    }
}

fn square(
    position: usize,
    matrix: Labelled<Vec<Vec<f64>>>,
    node_count: usize,
) -> Result<Labelled<Matrix>> {
    let array = || ArrayId::new(ArrayKind::Matrix, position, Arc::clone(&matrix.label));
    if matrix.values.len() != node_count {
        return Err(NetworkError::ShapeMismatch {
            array: array(),
            row: None,
            expected: node_count,
            actual: matrix.values.len(),
        });
    }
    if let Some((row, values)) = matrix
        .values
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != node_count)
    {
        return Err(NetworkError::ShapeMismatch {
            array: array(),
            row: Some(row),
            expected: node_count,
            actual: values.len(),
        });
    }
    Ok(Labelled {
        label: matrix.label,
        values: Matrix::from_square_rows(node_count, matrix.values),
    })
}

fn check_lengths<T>(kind: ArrayKind, arrays: &[Labelled<Vec<T>>], node_count: usize) -> Result<()> {
    match arrays
        .iter()
        .enumerate()
        .find(|(_, array)| array.values.len() != node_count)
    {
        Some((position, array)) => Err(NetworkError::ShapeMismatch {
            array: ArrayId::new(kind, position, Arc::clone(&array.label)),
            row: None,
            expected: node_count,
            actual: array.values.len(),
        }),
        None => Ok(()),
    }
}

fn check_index(target: &'static str, index: Option<usize>, len: usize) -> Result<()> {
    match index {
        Some(index) if index >= len => Err(NetworkError::out_of_range(target, index, len)),
        _ => Ok(()),
    }
}
