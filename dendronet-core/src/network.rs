//! The connectivity network and its derived state.
//!
//! A [`Network`] owns its matrices and per-node arrays together with the
//! state derived from them: thresholded edges, the dendrogram and the per
//! matrix weight statistics. Structural setters always re-derive in the same
//! order: edges, tree build, prune (when enabled), flatten.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    Result,
    dendrogram::{Cluster, Dendrogram, Linkage},
    error::NetworkError,
    graph::{self, Edge, Node},
    matrix::Matrix,
    scale::{self, ScaleConfig, WeightRange},
    threshold::ThresholdPolicy,
};

/// A value paired with the label it is presented under.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Labelled<T> {
    pub(crate) label: Arc<str>,
    pub(crate) values: T,
}

impl<T> AsRef<T> for Labelled<T> {
    fn as_ref(&self) -> &T {
        &self.values
    }
}

impl<T> Labelled<T> {
    pub(crate) fn new(label: impl Into<Arc<str>>, values: T) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Validated inputs handed over by the builder.
pub(crate) struct NetworkParts {
    pub(crate) name: Arc<str>,
    pub(crate) node_count: usize,
    pub(crate) matrices: Vec<Labelled<Matrix>>,
    pub(crate) linkage: Option<Linkage>,
    pub(crate) node_data: Vec<Labelled<Vec<f64>>>,
    pub(crate) node_names: Vec<Labelled<Vec<String>>>,
    pub(crate) node_orders: Vec<Labelled<Vec<f64>>>,
    pub(crate) thumbnails: Option<Arc<str>>,
    pub(crate) policy: Arc<dyn ThresholdPolicy>,
    pub(crate) threshold_params: Vec<f64>,
    pub(crate) threshold_param_labels: Vec<String>,
    pub(crate) threshold_idx: usize,
    pub(crate) node_order_idx: Option<usize>,
    pub(crate) node_name_idx: Option<usize>,
    pub(crate) num_clusters: usize,
    pub(crate) pruning: bool,
    pub(crate) scale: Option<Arc<ScaleConfig>>,
    pub(crate) full_net_indices: Option<Vec<usize>>,
}

/// Edges, tree and statistics derived from the inputs and current settings.
struct Derived {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    tree: Dendrogram,
    weight_stats: Vec<Option<WeightRange>>,
}

/// Settings that drive derivation.
#[derive(Clone)]
struct Settings {
    threshold_idx: usize,
    params: Vec<f64>,
    pruning: bool,
    num_clusters: usize,
}

/// A thresholded connectivity network with its dendrogram.
///
/// # Examples
/// ```
/// use dendronet_core::{AbsoluteCutoff, Linkage, NetworkBuilder};
/// use std::sync::Arc;
///
/// let linkage = Linkage::try_from_rows(vec![vec![1.0, 2.0, 0.1], vec![3.0, 4.0, 0.3]])
///     .expect("rows are well formed");
/// let mut network = NetworkBuilder::new()
///     .with_matrix("w", vec![vec![1.0; 4]; 4])
///     .with_linkage(linkage)
///     .with_threshold_policy(Arc::new(AbsoluteCutoff))
///     .with_num_clusters(4)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(network.clusters().len(), 2);
///
/// network.set_num_clusters(1).expect("cluster count is accepted");
/// assert_eq!(network.clusters().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Network {
    name: Arc<str>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    matrices: Vec<Labelled<Matrix>>,
    node_data_labels: Vec<Arc<str>>,
    node_names: Vec<Labelled<Vec<String>>>,
    node_orders: Vec<Labelled<Vec<f64>>>,
    linkage: Option<Linkage>,
    thumbnails: Option<Arc<str>>,
    policy: Arc<dyn ThresholdPolicy>,
    threshold_params: Vec<f64>,
    threshold_param_labels: Vec<String>,
    threshold_idx: usize,
    num_clusters: usize,
    pruning: bool,
    node_order_idx: Option<usize>,
    node_name_idx: Option<usize>,
    edge_colour_idx: usize,
    edge_width_idx: usize,
    node_colour_idx: Option<usize>,
    tree: Dendrogram,
    weight_stats: Vec<Option<WeightRange>>,
    scale: Arc<ScaleConfig>,
}

impl Network {
    pub(crate) fn assemble(parts: NetworkParts) -> Result<Self> {
        let NetworkParts {
            name,
            node_count,
            matrices,
            linkage,
            node_data,
            node_names,
            node_orders,
            thumbnails,
            policy,
            threshold_params,
            threshold_param_labels,
            threshold_idx,
            node_order_idx,
            node_name_idx,
            num_clusters,
            pruning,
            scale,
            full_net_indices,
        } = parts;

        let nodes = (0..node_count)
            .map(|index| {
                let data = node_data
                    .iter()
                    .filter_map(|array| array.values.get(index).copied())
                    .collect();
                let full = full_net_indices
                    .as_ref()
                    .and_then(|indices| indices.get(index).copied());
                Node::new(index, data, full)
            })
            .collect();

        let mut network = Self {
            name,
            nodes,
            edges: Vec::new(),
            matrices,
            node_data_labels: node_data.into_iter().map(|array| array.label).collect(),
            node_names,
            node_orders,
            linkage,
            thumbnails,
            policy,
            threshold_params,
            threshold_param_labels,
            threshold_idx,
            num_clusters,
            pruning,
            node_order_idx,
            node_name_idx,
            edge_colour_idx: 0,
            edge_width_idx: 0,
            node_colour_idx: None,
            tree: Dendrogram::flat(node_count),
            weight_stats: Vec::new(),
            scale: Arc::new(ScaleConfig::default()),
        };
        let derived = network.derive(&network.settings())?;
        network.scale = match scale {
            Some(shared) => shared,
            None => Arc::new(ScaleConfig::from_edges(
                &derived.edges,
                network.matrices.len(),
            )),
        };
        network.commit(derived);
        info!(
            network = %network.name,
            nodes = network.nodes.len(),
            edges = network.edges.len(),
            clusters = network.tree.cluster_nodes().len(),
            "network built"
        );
        Ok(network)
    }

    fn settings(&self) -> Settings {
        Settings {
            threshold_idx: self.threshold_idx,
            params: self.threshold_params.clone(),
            pruning: self.pruning,
            num_clusters: self.num_clusters,
        }
    }

    /// Computes edges and tree for `settings` without touching `self`.
    fn derive(&self, settings: &Settings) -> Result<Derived> {
        let mut nodes = self.nodes.clone();
        let edges =
            self.thresholded_edges(&mut nodes, settings.threshold_idx, &settings.params)?;
        let mut tree = self.fresh_tree()?;
        if settings.pruning {
            tree.prune(disconnected(&nodes));
        }
        tree.flatten(settings.num_clusters);
        let weight_stats = scale::weight_stats(&edges, self.matrices.len());
        Ok(Derived {
            nodes,
            edges,
            tree,
            weight_stats,
        })
    }

    fn commit(&mut self, derived: Derived) {
        self.nodes = derived.nodes;
        self.edges = derived.edges;
        self.tree = derived.tree;
        self.weight_stats = derived.weight_stats;
    }

    fn thresholded_edges(
        &self,
        nodes: &mut [Node],
        threshold_idx: usize,
        params: &[f64],
    ) -> Result<Vec<Edge>> {
        let matrix = self.matrices.get(threshold_idx).ok_or_else(|| {
            NetworkError::out_of_range("threshold", threshold_idx, self.matrices.len())
        })?;
        let thresholded = self.policy.apply(&matrix.values, params);
        Ok(graph::connect(nodes, &self.matrices, &thresholded))
    }

    fn fresh_tree(&self) -> Result<Dendrogram> {
        match &self.linkage {
            Some(linkage) => Dendrogram::from_linkage(self.nodes.len(), linkage),
            None => Ok(Dendrogram::flat(self.nodes.len())),
        }
    }

    /// Rebuilds edges from the selected matrix, policy and parameters.
    ///
    /// Also refreshes the per-matrix weight statistics. The tree is left
    /// alone; call [`Self::build_tree`] and the following steps to bring it
    /// in line with the new connectivity.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] when the threshold index does
    /// not select a matrix.
    #[instrument(
        name = "core.build_edges",
        err,
        skip(self),
        fields(network = %self.name, threshold_idx = self.threshold_idx),
    )]
    pub fn build_edges(&mut self) -> Result<()> {
        let mut nodes = self.nodes.clone();
        let edges =
            self.thresholded_edges(&mut nodes, self.threshold_idx, &self.threshold_params)?;
        debug!(edges = edges.len(), "edges rebuilt");
        self.weight_stats = scale::weight_stats(&edges, self.matrices.len());
        self.nodes = nodes;
        self.edges = edges;
        Ok(())
    }

    /// Rebuilds the full dendrogram from the linkage table, or a flat tree
    /// when there is none. Undoes any pruning or flattening.
    ///
    /// # Errors
    /// Returns [`NetworkError::MalformedLinkage`] when the linkage cannot be
    /// resolved.
    #[instrument(
        name = "core.build_tree",
        err,
        skip(self),
        fields(network = %self.name, linkage = self.linkage.is_some()),
    )]
    pub fn build_tree(&mut self) -> Result<()> {
        self.tree = self.fresh_tree()?;
        Ok(())
    }

    /// Detaches disconnected nodes from the tree when pruning is enabled.
    #[instrument(name = "core.prune_tree", skip(self), fields(network = %self.name))]
    pub fn prune_tree(&mut self) {
        if !self.pruning {
            return;
        }
        let removed: Vec<usize> = disconnected(&self.nodes).collect();
        debug!(pruned = removed.len(), "pruning disconnected nodes");
        self.tree.prune(removed);
    }

    /// Cuts the current tree into at most `max_clusters` clusters.
    ///
    /// Flattening only merges; raising the bound requires rebuilding the tree,
    /// which [`Self::set_num_clusters`] does.
    #[instrument(name = "core.flatten_tree", skip(self), fields(network = %self.name))]
    pub fn flatten_tree(&mut self, max_clusters: usize) {
        self.tree.flatten(max_clusters);
        debug!(clusters = self.tree.cluster_nodes().len(), "tree flattened");
    }

    fn rederive(&mut self, settings: &Settings) -> Result<()> {
        let derived = self.derive(settings)?;
        self.commit(derived);
        Ok(())
    }

    /// Thresholds a different matrix.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] when `idx` does not select a
    /// matrix; the network is left unchanged.
    #[instrument(name = "core.set_threshold_idx", err, skip(self), fields(network = %self.name))]
    pub fn set_threshold_idx(&mut self, idx: usize) -> Result<()> {
        if idx >= self.matrices.len() {
            return Err(NetworkError::out_of_range("threshold", idx, self.matrices.len()));
        }
        let settings = Settings {
            threshold_idx: idx,
            ..self.settings()
        };
        self.rederive(&settings)?;
        self.threshold_idx = idx;
        Ok(())
    }

    /// Changes one threshold parameter.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] when `param_idx` does not
    /// select a parameter; the network is left unchanged.
    #[instrument(name = "core.set_threshold_value", err, skip(self), fields(network = %self.name))]
    pub fn set_threshold_value(&mut self, param_idx: usize, value: f64) -> Result<()> {
        let mut settings = self.settings();
        let len = settings.params.len();
        let slot = settings
            .params
            .get_mut(param_idx)
            .ok_or_else(|| NetworkError::out_of_range("threshold parameter", param_idx, len))?;
        *slot = value;
        self.rederive(&settings)?;
        self.threshold_params = settings.params;
        Ok(())
    }

    /// Re-cuts the dendrogram into at most `clusters` clusters. Values below
    /// one are treated as one.
    ///
    /// # Errors
    /// Returns [`NetworkError::MalformedLinkage`] if the tree cannot be
    /// rebuilt; the network is left unchanged.
    #[instrument(name = "core.set_num_clusters", err, skip(self), fields(network = %self.name))]
    pub fn set_num_clusters(&mut self, clusters: usize) -> Result<()> {
        let settings = Settings {
            num_clusters: clusters,
            ..self.settings()
        };
        self.rederive(&settings)?;
        self.num_clusters = clusters;
        Ok(())
    }

    /// Enables or disables pruning of disconnected nodes. Disabling rebuilds
    /// the tree so pruned nodes return.
    ///
    /// # Errors
    /// Returns [`NetworkError::MalformedLinkage`] if the tree cannot be
    /// rebuilt; the network is left unchanged.
    #[instrument(name = "core.set_pruning_state", err, skip(self), fields(network = %self.name))]
    pub fn set_pruning_state(&mut self, enabled: bool) -> Result<()> {
        let settings = Settings {
            pruning: enabled,
            ..self.settings()
        };
        self.rederive(&settings)?;
        self.pruning = enabled;
        Ok(())
    }

    /// Selects the display-order array; `None` uses dendrogram order.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] for an unknown array.
    pub fn set_node_order_idx(&mut self, idx: Option<usize>) -> Result<()> {
        self.node_order_idx = checked(idx, "node order", self.node_orders.len())?;
        Ok(())
    }

    /// Selects the node-name array; `None` names nodes by 1-based index.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] for an unknown array.
    pub fn set_node_name_idx(&mut self, idx: Option<usize>) -> Result<()> {
        self.node_name_idx = checked(idx, "node name", self.node_names.len())?;
        Ok(())
    }

    /// Selects the matrix edges are coloured by.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] for an unknown matrix.
    pub fn set_edge_colour_idx(&mut self, idx: usize) -> Result<()> {
        self.edge_colour_idx = required(idx, "edge colour", self.matrices.len())?;
        Ok(())
    }

    /// Selects the matrix edge widths are scaled by.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] for an unknown matrix.
    pub fn set_edge_width_idx(&mut self, idx: usize) -> Result<()> {
        self.edge_width_idx = required(idx, "edge width", self.matrices.len())?;
        Ok(())
    }

    /// Selects the node-data array nodes are coloured by; `None` colours by
    /// cluster.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] for an unknown array.
    pub fn set_node_colour_idx(&mut self, idx: Option<usize>) -> Result<()> {
        self.node_colour_idx = checked(idx, "node colour", self.node_data_labels.len())?;
        Ok(())
    }

    /// Returns the diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns every node in index order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns node `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Returns the current edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the loaded matrices in order.
    pub fn matrices(&self) -> impl ExactSizeIterator<Item = &Matrix> {
        self.matrices.iter().map(|matrix| &matrix.values)
    }

    /// Returns matrix `index`.
    #[must_use]
    pub fn matrix(&self, index: usize) -> Option<&Matrix> {
        self.matrices.get(index).map(|matrix| &matrix.values)
    }

    /// Returns the matrix labels in order.
    pub fn matrix_labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.matrices.iter().map(|matrix| &*matrix.label)
    }

    /// Returns the node-data labels in order.
    pub fn node_data_labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.node_data_labels.iter().map(|label| &**label)
    }

    /// Returns the node-name array labels in order.
    pub fn node_name_labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.node_names.iter().map(|names| &*names.label)
    }

    /// Returns the node-order array labels in order.
    pub fn node_order_labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.node_orders.iter().map(|order| &*order.label)
    }

    /// Returns the linkage table, if one was supplied.
    #[must_use]
    pub fn linkage(&self) -> Option<&Linkage> {
        self.linkage.as_ref()
    }

    /// Returns the threshold policy.
    #[must_use]
    pub fn policy(&self) -> &Arc<dyn ThresholdPolicy> {
        &self.policy
    }

    /// Returns the current threshold parameters.
    #[must_use]
    pub fn threshold_params(&self) -> &[f64] {
        &self.threshold_params
    }

    /// Returns one label per threshold parameter.
    #[must_use]
    pub fn threshold_param_labels(&self) -> &[String] {
        &self.threshold_param_labels
    }

    /// Returns the index of the thresholded matrix.
    #[must_use]
    pub fn threshold_idx(&self) -> usize {
        self.threshold_idx
    }

    /// Returns the requested cluster count.
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Returns whether disconnected nodes are pruned.
    #[must_use]
    pub fn pruning(&self) -> bool {
        self.pruning
    }

    /// Returns the selected display-order array.
    #[must_use]
    pub fn node_order_idx(&self) -> Option<usize> {
        self.node_order_idx
    }

    /// Returns the selected node-name array.
    #[must_use]
    pub fn node_name_idx(&self) -> Option<usize> {
        self.node_name_idx
    }

    /// Returns the matrix edges are coloured by.
    #[must_use]
    pub fn edge_colour_idx(&self) -> usize {
        self.edge_colour_idx
    }

    /// Returns the matrix edge widths are scaled by.
    #[must_use]
    pub fn edge_width_idx(&self) -> usize {
        self.edge_width_idx
    }

    /// Returns the node-data array nodes are coloured by.
    #[must_use]
    pub fn node_colour_idx(&self) -> Option<usize> {
        self.node_colour_idx
    }

    /// Returns the dendrogram.
    #[must_use]
    pub fn tree(&self) -> &Dendrogram {
        &self.tree
    }

    /// Returns the tree node grouping `node`; `None` when pruned.
    #[must_use]
    pub fn parent_of(&self, node: usize) -> Option<usize> {
        self.tree.leaf_parent(node)
    }

    /// Returns the current flat clusters.
    #[must_use]
    pub fn clusters(&self) -> Vec<Cluster> {
        self.tree.clusters()
    }

    /// Returns the display name of `node`.
    ///
    /// Without a selected name array, nodes are named by 1-based index.
    #[must_use]
    pub fn node_name(&self, node: usize) -> Option<String> {
        if node >= self.nodes.len() {
            return None;
        }
        match self
            .node_name_idx
            .and_then(|idx| self.node_names.get(idx))
        {
            Some(names) => names.values.get(node).cloned(),
            None => Some((node + 1).to_string()),
        }
    }

    /// Returns every display name in node order.
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        (0..self.nodes.len())
            .filter_map(|node| self.node_name(node))
            .collect()
    }

    pub(crate) fn name_arrays(&self) -> &[Labelled<Vec<String>>] {
        &self.node_names
    }

    pub(crate) fn order_arrays(&self) -> &[Labelled<Vec<f64>>] {
        &self.node_orders
    }

    /// Returns node indices in display order.
    ///
    /// With a selected order array, nodes are sorted by ascending value and
    /// then by index. Otherwise the dendrogram leaf order is used, followed by
    /// pruned nodes in index order.
    #[must_use]
    pub fn display_order(&self) -> Vec<usize> {
        if let Some(order) = self
            .node_order_idx
            .and_then(|idx| self.node_orders.get(idx))
        {
            let mut indices: Vec<usize> = (0..self.nodes.len()).collect();
            indices.sort_by(|&left, &right| {
                let a = order.values.get(left).copied().unwrap_or(f64::NAN);
                let b = order.values.get(right).copied().unwrap_or(f64::NAN);
                a.total_cmp(&b).then(left.cmp(&right))
            });
            return indices;
        }
        let mut order = self.tree.leaf_order();
        let mut placed = vec![false; self.nodes.len()];
        for &node in &order {
            if let Some(flag) = placed.get_mut(node) {
                *flag = true;
            }
        }
        let pruned = placed
            .iter()
            .enumerate()
            .filter(|(_, placed)| !**placed)
            .map(|(node, _)| node);
        order.extend(pruned.collect::<Vec<_>>());
        order
    }

    /// Returns the thumbnail path of `node`, addressed by its index in the
    /// full network.
    ///
    /// # Examples
    /// ```
    /// use dendronet_core::{AbsoluteCutoff, NetworkBuilder};
    /// use std::sync::Arc;
    ///
    /// let network = NetworkBuilder::new()
    ///     .with_matrix("w", vec![vec![0.0, 1.0], vec![1.0, 0.0]])
    ///     .with_threshold_policy(Arc::new(AbsoluteCutoff))
    ///     .with_thumbnails("thumbs")
    ///     .build()
    ///     .expect("configuration is valid");
    /// assert_eq!(network.thumbnail(1).as_deref(), Some("thumbs/0001.png"));
    /// ```
    #[must_use]
    pub fn thumbnail(&self, node: usize) -> Option<String> {
        let base = self.thumbnails.as_deref()?;
        let node = self.nodes.get(node)?;
        let index = node.full_net_index().unwrap_or(node.index());
        Some(format!("{base}/{index:04}.png"))
    }

    /// Returns the thumbnail base path.
    #[must_use]
    pub fn thumbnails(&self) -> Option<&Arc<str>> {
        self.thumbnails.as_ref()
    }

    /// Returns per-matrix weight statistics over the current edges.
    #[must_use]
    pub fn weight_stats(&self) -> &[Option<WeightRange>] {
        &self.weight_stats
    }

    /// Returns the scale configuration shared with extracted sub-networks.
    #[must_use]
    pub fn scale_config(&self) -> &Arc<ScaleConfig> {
        &self.scale
    }
}

fn disconnected(nodes: &[Node]) -> impl Iterator<Item = usize> + '_ {
    nodes
        .iter()
        .filter(|node| node.is_disconnected())
        .map(Node::index)
}

fn checked(idx: Option<usize>, target: &'static str, len: usize) -> Result<Option<usize>> {
    match idx {
        Some(index) if index >= len => Err(NetworkError::out_of_range(target, index, len)),
        other => Ok(other),
    }
}

fn required(idx: usize, target: &'static str, len: usize) -> Result<usize> {
    if idx >= len {
        return Err(NetworkError::out_of_range(target, idx, len));
    }
    Ok(idx)
}
