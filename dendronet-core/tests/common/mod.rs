//! Network fixtures shared by the integration suites.

use std::sync::Arc;

use dendronet_core::{AbsoluteCutoff, Linkage, Network, NetworkBuilder};

/// Three nodes where only the pair (0, 1) clears a 0.5 cutoff.
pub fn triangle_rows() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.9, 0.2],
        vec![0.9, 0.0, 0.1],
        vec![0.2, 0.1, 0.0],
    ]
}

pub fn triangle(cutoff: f64) -> NetworkBuilder {
    NetworkBuilder::new()
        .with_name("triangle")
        .with_matrix("weights", triangle_rows())
        .with_threshold_policy(Arc::new(AbsoluteCutoff))
        .with_threshold_params(vec![cutoff])
}

/// Two merges over four leaves: {0, 1} at 0.1 and {2, 3} at 0.3.
pub fn pairs_linkage() -> Linkage {
    Linkage::try_from_rows(vec![vec![1.0, 2.0, 0.1], vec![3.0, 4.0, 0.3]])
        .expect("pairs linkage must decode")
}

/// Four nodes forming a chain 0-1-2-3 plus a weak 0-3 link, with a second
/// matrix of negated weights and two node-order arrays.
pub fn chain_rows() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.8, 0.0, 0.3],
        vec![0.8, 0.0, 0.7, 0.0],
        vec![0.0, 0.7, 0.0, 0.6],
        vec![0.3, 0.0, 0.6, 0.0],
    ]
}

pub fn chain() -> NetworkBuilder {
    let negated = chain_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|value| -value).collect())
        .collect();
    NetworkBuilder::new()
        .with_name("chain")
        .with_matrix("strength", chain_rows())
        .with_matrix("negated", negated)
        .with_linkage(pairs_linkage())
        .with_node_data("degree", vec![2.0, 2.0, 2.0, 2.0])
        .with_node_names(
            "labels",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
        )
        .with_node_order("reverse", vec![3.0, 2.0, 1.0, 0.0])
        .with_node_order("spread", vec![10.0, 40.0, 20.0, 30.0])
        .with_threshold_policy(Arc::new(AbsoluteCutoff))
        .with_threshold_params(vec![0.5])
        .with_thumbnails("thumbs")
        .with_num_clusters(4)
}

pub fn build(builder: NetworkBuilder) -> Network {
    builder.build().expect("fixture network must build")
}

/// Members of each current cluster.
pub fn memberships(network: &Network) -> Vec<Vec<usize>> {
    network
        .clusters()
        .into_iter()
        .map(|cluster| cluster.members)
        .collect()
}

pub fn edge_pairs(network: &Network) -> Vec<(usize, usize)> {
    network
        .edges()
        .iter()
        .map(|edge| (edge.i(), edge.j()))
        .collect()
}
