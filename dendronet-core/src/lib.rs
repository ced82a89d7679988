//! Dendronet core library.
//!
//! Data model behind a circular connectivity-network viewer: square weight
//! matrices thresholded into edges, a dendrogram built from a
//! hierarchical-clustering linkage table, pruning of disconnected nodes,
//! flattening into a bounded number of clusters, and extraction of a node's
//! neighbourhood as a standalone [`Network`]. The crate performs no I/O.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod dendrogram;
mod error;
mod graph;
mod matrix;
mod network;
mod scale;
mod subnet;
mod threshold;

pub use crate::{
    builder::NetworkBuilder,
    dendrogram::{Cluster, Dendrogram, Linkage, LinkageRow, TreeNode, TreeNodeKind},
    error::{ArrayId, ArrayKind, NetworkError, NetworkErrorCode, Result},
    graph::{Edge, Node},
    matrix::Matrix,
    network::Network,
    scale::{ScaleConfig, WeightRange},
    subnet::adjust_indices,
    threshold::{
        AbsoluteCutoff, DEFAULT_ROW_FRACTION, RowPercentileCutoff, Symmetric, ThresholdKind,
        ThresholdPolicy, UnknownThresholdKind,
    },
};
