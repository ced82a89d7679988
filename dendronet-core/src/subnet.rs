//! Extraction of a node's neighbourhood as an independent network.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    Result,
    builder::NetworkBuilder,
    error::NetworkError,
    network::Network,
};

const INDEX_NAMES_LABEL: &str = "index";

impl Network {
    /// Builds a new network from `root` and its current neighbours.
    ///
    /// Nodes keep ascending index order. Matrices are restricted to the same
    /// index set, per-node arrays are gathered, and order arrays are re-ranked
    /// among the retained nodes. The result has no linkage, starts with a
    /// single flat cluster holding every member with pruning off, and shares this network's [`crate::ScaleConfig`] and
    /// thumbnail base path.
    ///
    /// # Errors
    /// Returns [`NetworkError::IndexOutOfRange`] when `root` is not a node.
    ///
    /// # Examples
    /// ```
    /// use dendronet_core::{AbsoluteCutoff, NetworkBuilder};
    /// use std::sync::Arc;
    ///
    /// let network = NetworkBuilder::new()
    ///     .with_matrix(
    ///         "w",
    ///         vec![vec![0.0, 0.9, 0.2], vec![0.9, 0.0, 0.1], vec![0.2, 0.1, 0.0]],
    ///     )
    ///     .with_threshold_policy(Arc::new(AbsoluteCutoff))
    ///     .with_threshold_params(vec![0.5])
    ///     .build()
    ///     .expect("configuration is valid");
    /// let sub = network.extract_sub_network(1).expect("node 1 exists");
    /// assert_eq!(sub.node_count(), 2);
    /// assert_eq!(sub.node_names(), vec!["1".to_owned(), "2".to_owned()]);
    /// assert!(Arc::ptr_eq(sub.scale_config(), network.scale_config()));
    /// ```
    #[instrument(
        name = "core.extract_sub_network",
        err,
        skip(self),
        fields(network = %self.name()),
    )]
    pub fn extract_sub_network(&self, root: usize) -> Result<Self> {
        let node = self
            .node(root)
            .ok_or_else(|| NetworkError::out_of_range("node", root, self.node_count()))?;
        let mut indices: Vec<usize> = std::iter::once(root)
            .chain(node.neighbours().iter().copied())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        debug!(nodes = indices.len(), "extracting sub-network");

        let mut builder = NetworkBuilder::new()
            .with_name(format!("{}/subnet-{root}", self.name()))
            .with_threshold_policy(Arc::clone(self.policy()))
            .with_threshold_params(self.threshold_params().to_vec())
            .with_threshold_param_labels(self.threshold_param_labels().to_vec())
            .with_threshold_idx(self.threshold_idx())
            .with_num_clusters(1)
            .with_pruning(false)
            .with_node_order_idx(self.node_order_idx())
            .with_scale_config(Arc::clone(self.scale_config()))
            .with_full_net_indices(
                indices
                    .iter()
                    .map(|&index| self.full_index_of(index))
                    .collect(),
            );

        for (label, matrix) in self.matrix_labels().zip(self.matrices()) {
            let sub = matrix
                .sub_matrix(&indices)
                .ok_or_else(|| NetworkError::out_of_range("node", root, self.node_count()))?;
            builder = builder.with_matrix(label, sub.rows().map(<[f64]>::to_vec).collect());
        }
        for (position, label) in self.node_data_labels().enumerate() {
            let values = indices
                .iter()
                .filter_map(|&index| self.node(index)?.node_data().get(position).copied())
                .collect();
            builder = builder.with_node_data(label, values);
        }
        for names in self.name_arrays() {
            builder = builder.with_node_names(Arc::clone(&names.label), gather(&names.values, &indices));
        }
        let name_idx = match self.node_name_idx() {
            Some(idx) => idx,
            None => {
                builder = builder.with_node_names(
                    INDEX_NAMES_LABEL,
                    indices.iter().map(|&index| (index + 1).to_string()).collect(),
                );
                self.name_arrays().len()
            }
        };
        builder = builder.with_node_name_idx(Some(name_idx));

        let mask = inclusion_mask(self.node_count(), &indices);
        for order in self.order_arrays() {
            #[expect(
                clippy::cast_precision_loss,
                reason = "ranks are bounded by the node count"
            )]
            let ranks = adjust_indices(&order.values, &mask)
                .into_iter()
                .map(|rank| rank as f64)
                .collect();
            builder = builder.with_node_order(Arc::clone(&order.label), ranks);
        }
        if let Some(base) = self.thumbnails() {
            builder = builder.with_thumbnails(Arc::clone(base));
        }

        let mut sub = builder.build()?;
        sub.set_edge_colour_idx(self.edge_colour_idx())?;
        sub.set_edge_width_idx(self.edge_width_idx())?;
        sub.set_node_colour_idx(self.node_colour_idx())?;
        Ok(sub)
    }

    fn full_index_of(&self, index: usize) -> usize {
        self.node(index)
            .and_then(|node| node.full_net_index())
            .unwrap_or(index)
    }
}

fn gather<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices
        .iter()
        .filter_map(|&index| values.get(index).cloned())
        .collect()
}

fn inclusion_mask(len: usize, indices: &[usize]) -> Vec<bool> {
    let mut mask = vec![false; len];
    for &index in indices {
        if let Some(slot) = mask.get_mut(index) {
            *slot = true;
        }
    }
    mask
}

/// Re-ranks the order values of included entries among themselves.
///
/// Returns one rank per `true` entry of `mask`, in index order. Ranks are
/// dense from zero; equal values keep their index order.
///
/// # Examples
/// ```
/// use dendronet_core::adjust_indices;
///
/// let order = [3.0, 0.0, 4.0, 1.0, 2.0];
/// let mask = [true, false, true, true, false];
/// assert_eq!(adjust_indices(&order, &mask), vec![1, 2, 0]);
/// ```
#[must_use]
pub fn adjust_indices(values: &[f64], mask: &[bool]) -> Vec<usize> {
    let included: Vec<(usize, f64)> = values
        .iter()
        .zip(mask)
        .enumerate()
        .filter(|(_, (_, keep))| **keep)
        .map(|(index, (value, _))| (index, *value))
        .collect();
    let mut by_value: Vec<usize> = (0..included.len()).collect();
    by_value.sort_by(|&left, &right| {
        let (left_index, left_value) = included.get(left).copied().unwrap_or((left, f64::NAN));
        let (right_index, right_value) = included.get(right).copied().unwrap_or((right, f64::NAN));
        left_value
            .total_cmp(&right_value)
            .then(left_index.cmp(&right_index))
    });
    let mut ranks = vec![0; included.len()];
    for (rank, position) in by_value.into_iter().enumerate() {
        if let Some(slot) = ranks.get_mut(position) {
            *slot = rank;
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::all_kept(vec![2.0, 0.0, 1.0], vec![true, true, true], vec![2, 0, 1])]
    #[case::gaps_closed(vec![10.0, 0.0, 30.0, 20.0], vec![true, false, true, true], vec![0, 2, 1])]
    #[case::ties_by_index(vec![1.0, 1.0, 0.0], vec![true, true, true], vec![1, 2, 0])]
    #[case::nothing_kept(vec![1.0, 2.0], vec![false, false], vec![])]
    fn adjust_indices_ranks_included_values(
        #[case] values: Vec<f64>,
        #[case] mask: Vec<bool>,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(adjust_indices(&values, &mask), expected);
    }

    #[test]
    fn inclusion_mask_ignores_out_of_range_indices() {
        assert_eq!(inclusion_mask(3, &[0, 2, 7]), vec![true, false, true]);
    }
}
