//! Nodes and thresholded edges.

use crate::matrix::Matrix;

/// One network node.
///
/// Neighbour and edge lists are replaced whenever the network is
/// re-thresholded.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    index: usize,
    node_data: Vec<f64>,
    neighbours: Vec<usize>,
    edges: Vec<usize>,
    full_net_index: Option<usize>,
}

impl Node {
    pub(crate) fn new(index: usize, node_data: Vec<f64>, full_net_index: Option<usize>) -> Self {
        Self {
            index,
            node_data,
            neighbours: Vec::new(),
            edges: Vec::new(),
            full_net_index,
        }
    }

    /// Returns the zero-based node index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns one scalar per node-data array, aligned with the network's
    /// node-data labels.
    #[must_use]
    pub fn node_data(&self) -> &[f64] {
        &self.node_data
    }

    /// Returns the indices of adjacent nodes in ascending order.
    ///
    /// Edges are created row by row over the upper triangle, which keeps
    /// this list sorted without an extra pass.
    #[must_use]
    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }

    /// Returns the indices of incident edges.
    #[must_use]
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Returns the index of this node in the network it was extracted from.
    #[must_use]
    pub fn full_net_index(&self) -> Option<usize> {
        self.full_net_index
    }

    /// Returns whether thresholding left this node without edges.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.neighbours.is_empty()
    }
}

/// An undirected edge between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    i: usize,
    j: usize,
    weights: Vec<f64>,
}

impl Edge {
    /// Returns the lower endpoint.
    #[must_use]
    pub fn i(&self) -> usize {
        self.i
    }

    /// Returns the higher endpoint.
    #[must_use]
    pub fn j(&self) -> usize {
        self.j
    }

    /// Returns one weight per loaded matrix, aligned with the matrix labels.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the weight taken from matrix `matrix`.
    #[must_use]
    pub fn weight(&self, matrix: usize) -> Option<f64> {
        self.weights.get(matrix).copied()
    }
}

/// Creates one edge per kept upper-triangle entry of `thresholded` and
/// records it on both endpoints.
///
/// Existing neighbour and edge lists on `nodes` are discarded.
pub(crate) fn connect<M: AsRef<Matrix>>(
    nodes: &mut [Node],
    matrices: &[M],
    thresholded: &Matrix,
) -> Vec<Edge> {
    for node in nodes.iter_mut() {
        node.neighbours.clear();
        node.edges.clear();
    }

    let dim = thresholded.dim().min(nodes.len());
    let mut edges = Vec::new();
    for i in 0..dim {
        for j in (i + 1)..dim {
            if thresholded.get(i, j).is_none_or(f64::is_nan) {
                continue;
            }
            let weights = matrices
                .iter()
                .map(|matrix| matrix.as_ref().get(i, j).unwrap_or(f64::NAN))
                .collect();
            let id = edges.len();
            edges.push(Edge { i, j, weights });
            for (from, to) in [(i, j), (j, i)] {
                if let Some(node) = nodes.get_mut(from) {
                    node.neighbours.push(to);
                    node.edges.push(id);
                }
            }
        }
    }
    edges
}
