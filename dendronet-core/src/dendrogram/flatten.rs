//! Cutting the tree into a bounded number of flat clusters.

use std::cmp::Ordering;

use tracing::trace;

use super::Dendrogram;

impl Dendrogram {
    /// Splices out the lowest merges until at most `max_clusters` clusters
    /// remain, or only the root groups leaves.
    ///
    /// A spliced merge hands its children to its own parent, so the leaves it
    /// held join the enclosing cluster. `max_clusters` below one is treated as
    /// one. Calling this again with the same bound changes nothing.
    ///
    /// # Examples
    /// ```
    /// use dendronet_core::{Dendrogram, Linkage};
    ///
    /// let linkage = Linkage::try_from_rows(vec![
    ///     vec![1.0, 2.0, 0.1],
    ///     vec![3.0, 4.0, 0.3],
    ///     vec![5.0, 6.0, 0.9],
    /// ])
    /// .expect("rows are well formed");
    /// let mut tree = Dendrogram::from_linkage(4, &linkage).expect("linkage resolves");
    /// tree.flatten(2);
    /// let members: Vec<Vec<usize>> = tree.clusters().into_iter().map(|c| c.members).collect();
    /// assert_eq!(members, vec![vec![0, 1], vec![2, 3]]);
    /// ```
    pub fn flatten(&mut self, max_clusters: usize) {
        let limit = max_clusters.max(1);
        loop {
            let clusters = self.cluster_nodes();
            if clusters.len() <= limit {
                break;
            }
            let Some(target) = self.lowest_merge(&clusters) else {
                break;
            };
            self.splice(target);
        }
    }

    fn lowest_merge(&self, clusters: &[usize]) -> Option<usize> {
        clusters
            .iter()
            .filter(|&&index| index != self.root)
            .filter_map(|&index| {
                let distance = self.nodes.get(index)?.distance?;
                Some((distance, index))
            })
            .min_by(|(left_distance, left), (right_distance, right)| {
                match left_distance.total_cmp(right_distance) {
                    Ordering::Equal => left.cmp(right),
                    other => other,
                }
            })
            .map(|(_, index)| index)
    }

    fn splice(&mut self, index: usize) {
        let Some(parent) = self.detach_from_parent(index) else {
            return;
        };
        let children = self
            .nodes
            .get_mut(index)
            .map(|record| {
                record.removed = true;
                std::mem::take(&mut record.children)
            })
            .unwrap_or_default();
        trace!(node = index, parent, moved = children.len(), "spliced merge");
        for &child in &children {
            if let Some(record) = self.nodes.get_mut(child) {
                record.parent = Some(parent);
            }
        }
        if let Some(record) = self.nodes.get_mut(parent) {
            record.children.extend(children);
        }
    }
}
