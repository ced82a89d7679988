//! Dendrogram trees over network nodes.
//!
//! The tree is stored as an arena of [`TreeNode`] records linked by index.
//! Slots `0..node_count` hold the leaves (one per network node), slot
//! `node_count + row` holds the merge created by linkage row `row`, and the
//! final slot holds a synthetic root that adopts every parentless merge or
//! leaf. The tree is binary everywhere except at the root.
//!
//! Pruning and flattening edit the arena in place. Neither is reversible:
//! callers rebuild from the linkage table to restore the full tree.

mod flatten;
mod linkage;
mod prune;

pub use self::linkage::{Linkage, LinkageRow};

use crate::error::{NetworkError, Result};

/// Role of a [`TreeNode`] within the dendrogram.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TreeNodeKind {
    /// A network node.
    Leaf {
        /// Index of the network node.
        node: usize,
    },
    /// A merge recorded by the linkage table.
    Merge,
    /// The synthetic root.
    Root,
}

/// One record of the dendrogram arena.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    index: usize,
    kind: TreeNodeKind,
    children: Vec<usize>,
    distance: Option<f64>,
    parent: Option<usize>,
    removed: bool,
}

impl TreeNode {
    fn new(index: usize, kind: TreeNodeKind, distance: Option<f64>) -> Self {
        Self {
            index,
            kind,
            children: Vec::new(),
            distance,
            parent: None,
            removed: false,
        }
    }

    /// Returns the arena index of this record.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the role of this record.
    #[must_use]
    pub fn kind(&self) -> TreeNodeKind {
        self.kind
    }

    /// Returns the arena indices of the children, in order.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Returns the merge height; `None` for leaves and the root.
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    /// Returns the arena index of the parent, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Returns whether pruning or flattening detached this record.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A flat cluster: a tree node together with the leaves attached directly
/// beneath it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cluster {
    /// Arena index of the tree node grouping the members.
    pub tree_node: usize,
    /// Network node indices, ascending.
    pub members: Vec<usize>,
}

/// Arena-backed dendrogram tree.
///
/// # Examples
/// ```
/// use dendronet_core::{Dendrogram, Linkage};
///
/// let linkage = Linkage::try_from_rows(vec![vec![1.0, 2.0, 0.1], vec![3.0, 4.0, 0.3]])
///     .expect("rows are well formed");
/// let tree = Dendrogram::from_linkage(4, &linkage).expect("linkage resolves");
/// assert_eq!(tree.root(), 6);
/// assert_eq!(tree.leaf_parent(0), Some(4));
/// assert_eq!(tree.leaf_order(), vec![0, 1, 2, 3]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    node_count: usize,
    nodes: Vec<TreeNode>,
    root: usize,
}

impl Dendrogram {
    fn with_leaves(node_count: usize, merges: usize) -> Self {
        let mut nodes = Vec::with_capacity(node_count + merges + 1);
        nodes.extend((0..node_count).map(|node| {
            TreeNode::new(node, TreeNodeKind::Leaf { node }, None)
        }));
        Self {
            node_count,
            nodes,
            root: node_count + merges,
        }
    }

    /// Builds the degenerate one-level tree used when no linkage is available:
    /// the root adopts every leaf directly.
    #[must_use]
    pub fn flat(node_count: usize) -> Self {
        let mut tree = Self::with_leaves(node_count, 0);
        tree.attach_root();
        tree
    }

    /// Builds the tree described by `linkage` over `node_count` leaves.
    ///
    /// # Errors
    /// Returns [`NetworkError::MalformedLinkage`] when the table has more than
    /// `node_count - 1` rows, a reference resolves to no leaf or earlier merge,
    /// both references of a row name the same cluster, or a cluster is merged
    /// twice.
    pub fn from_linkage(node_count: usize, linkage: &Linkage) -> Result<Self> {
        let max_rows = node_count.saturating_sub(1);
        if linkage.len() > max_rows {
            return Err(NetworkError::linkage(
                max_rows,
                format!(
                    "{} merges exceed the {max_rows} possible for {node_count} nodes",
                    linkage.len()
                ),
            ));
        }

        let mut tree = Self::with_leaves(node_count, linkage.len());
        for (row, merge) in linkage.rows().iter().enumerate() {
            let left = tree.resolve(row, merge.left)?;
            let right = tree.resolve(row, merge.right)?;
            if left == right {
                return Err(NetworkError::linkage(
                    row,
                    format!("row merges reference {} with itself", merge.left),
                ));
            }
            let index = node_count + row;
            let mut node = TreeNode::new(index, TreeNodeKind::Merge, Some(merge.distance));
            node.children = vec![left, right];
            tree.nodes.push(node);
            for child in [left, right] {
                if let Some(record) = tree.nodes.get_mut(child) {
                    record.parent = Some(index);
                }
            }
        }
        tree.attach_root();
        Ok(tree)
    }

    fn resolve(&self, row: usize, reference: usize) -> Result<usize> {
        let target = reference.checked_sub(1).ok_or_else(|| {
            NetworkError::linkage(row, "reference 0 is invalid for 1-indexed linkage")
        })?;
        // Only leaves and rows created before this one are in the arena yet.
        match self.nodes.get(target) {
            Some(node) if node.parent.is_some() => Err(NetworkError::linkage(
                row,
                format!("reference {reference} was already merged"),
            )),
            Some(_) => Ok(target),
            None => Err(NetworkError::linkage(
                row,
                format!("reference {reference} does not resolve to an existing cluster"),
            )),
        }
    }

    fn attach_root(&mut self) {
        let root = self.nodes.len();
        debug_assert_eq!(root, self.root);
        let mut node = TreeNode::new(root, TreeNodeKind::Root, None);
        for record in &mut self.nodes {
            if record.parent.is_none() {
                record.parent = Some(root);
                node.children.push(record.index);
            }
        }
        self.nodes.push(node);
    }

    /// Returns the number of leaves.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the arena index of the synthetic root.
    #[must_use]
    pub fn root(&self) -> usize {
        self.root
    }

    /// Returns the record at `index`, including detached ones.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Iterates over records still attached to the tree.
    pub fn live_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|node| !node.removed)
    }

    /// Returns the parent of the leaf for network node `node`; `None` when the
    /// node was pruned or does not exist.
    #[must_use]
    pub fn leaf_parent(&self, node: usize) -> Option<usize> {
        if node >= self.node_count {
            return None;
        }
        self.nodes.get(node).and_then(|leaf| leaf.parent)
    }

    /// Returns the current clusters: the distinct parents of attached leaves,
    /// in first-encountered order by leaf index.
    #[must_use]
    pub fn cluster_nodes(&self) -> Vec<usize> {
        let mut seen = vec![false; self.nodes.len()];
        let mut clusters = Vec::new();
        for parent in (0..self.node_count).filter_map(|node| self.leaf_parent(node)) {
            if let Some(flag) = seen.get_mut(parent) {
                if !*flag {
                    *flag = true;
                    clusters.push(parent);
                }
            }
        }
        clusters
    }

    /// Returns each current cluster with its directly attached leaves.
    #[must_use]
    pub fn clusters(&self) -> Vec<Cluster> {
        self.cluster_nodes()
            .into_iter()
            .map(|tree_node| Cluster {
                tree_node,
                members: (0..self.node_count)
                    .filter(|&node| self.leaf_parent(node) == Some(tree_node))
                    .collect(),
            })
            .collect()
    }

    /// Returns reachable leaves in depth-first, child order from the root.
    ///
    /// This is the order a radial cluster layout places nodes around the
    /// circle.
    #[must_use]
    pub fn leaf_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.node_count);
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            if let TreeNodeKind::Leaf { node } = node.kind {
                order.push(node);
                continue;
            }
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    fn detach_from_parent(&mut self, index: usize) -> Option<usize> {
        let parent = self.nodes.get_mut(index).and_then(|node| node.parent.take())?;
        if let Some(record) = self.nodes.get_mut(parent) {
            record.children.retain(|&child| child != index);
        }
        Some(parent)
    }
}
