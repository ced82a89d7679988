//! Tests for sub-network extraction.

mod common;

use std::sync::Arc;

use common::{build, chain, edge_pairs, memberships, triangle};
use dendronet_core::{AbsoluteCutoff, Matrix, NetworkError, ThresholdPolicy};
use rstest::rstest;

#[test]
fn sub_network_holds_root_and_neighbours() {
    let network = build(chain());
    let sub = network.extract_sub_network(1).expect("node 1 exists");
    assert_eq!(sub.node_count(), 3);
    assert_eq!(sub.name(), "chain/subnet-1");
    let full: Vec<Option<usize>> = sub.nodes().iter().map(|node| node.full_net_index()).collect();
    assert_eq!(full, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(edge_pairs(&sub), vec![(0, 1), (1, 2)]);
    assert!(sub.linkage().is_none());
    assert_eq!(memberships(&sub), vec![vec![0, 1, 2]]);
}

#[test]
fn sub_matrices_match_parent_restriction() {
    let network = build(chain());
    let sub = network.extract_sub_network(2).expect("node 2 exists");
    let indices = [1, 2, 3];
    for (parent, child) in network.matrices().zip(sub.matrices()) {
        for (row, &i) in indices.iter().enumerate() {
            for (col, &j) in indices.iter().enumerate() {
                assert_eq!(child.get(row, col), parent.get(i, j));
            }
        }
    }
    let labels: Vec<&str> = sub.matrix_labels().collect();
    assert_eq!(labels, vec!["strength", "negated"]);
}

#[test]
fn default_names_become_explicit() {
    let network = build(chain());
    let sub = network.extract_sub_network(2).expect("node 2 exists");
    assert_eq!(sub.node_names(), vec!["2", "3", "4"]);
    let labels: Vec<&str> = sub.node_name_labels().collect();
    assert_eq!(labels, vec!["labels", "index"]);
}

#[test]
fn selected_names_are_gathered() {
    let mut network = build(chain());
    network.set_node_name_idx(Some(0)).expect("names exist");
    let sub = network.extract_sub_network(2).expect("node 2 exists");
    assert_eq!(sub.node_names(), vec!["b", "c", "d"]);
    assert_eq!(sub.node_name_idx(), Some(0));
}

#[test]
fn order_arrays_are_reranked() {
    let mut network = build(chain());
    network.set_node_order_idx(Some(1)).expect("order exists");
    let sub = network.extract_sub_network(1).expect("node 1 exists");
    // Spread values 10, 40, 20 rank as 0, 2, 1 among the kept nodes.
    assert_eq!(sub.node_order_idx(), Some(1));
    assert_eq!(sub.display_order(), vec![0, 2, 1]);
}

#[test]
fn node_data_and_selections_carry_over() {
    let mut network = build(chain());
    network.set_edge_colour_idx(1).expect("matrix exists");
    network.set_node_colour_idx(Some(0)).expect("node data exists");
    let sub = network.extract_sub_network(0).expect("node 0 exists");
    assert_eq!(sub.nodes()[1].node_data(), &[2.0]);
    assert_eq!(sub.edge_colour_idx(), 1);
    assert_eq!(sub.node_colour_idx(), Some(0));
    assert_eq!(sub.threshold_params(), network.threshold_params());
}

#[test]
fn thumbnails_address_parent_indices() {
    let network = build(chain());
    let sub = network.extract_sub_network(2).expect("node 2 exists");
    assert_eq!(sub.thumbnail(0).as_deref(), Some("thumbs/0001.png"));
    let nested = sub.extract_sub_network(0).expect("sub node 0 exists");
    let full: Vec<Option<usize>> = nested.nodes().iter().map(|node| node.full_net_index()).collect();
    assert_eq!(full, vec![Some(1), Some(2)]);
    assert_eq!(nested.thumbnail(1).as_deref(), Some("thumbs/0002.png"));
}

#[test]
fn scale_config_is_shared_and_state_is_not() {
    let network = build(chain());
    let mut sub = network.extract_sub_network(1).expect("node 1 exists");
    assert!(Arc::ptr_eq(sub.scale_config(), network.scale_config()));
    sub.set_threshold_value(0, 5.0).expect("parameter exists");
    assert!(sub.edges().is_empty());
    assert_eq!(network.edges().len(), 3);
    assert_eq!(network.threshold_params(), &[0.5]);
}

#[test]
fn isolated_node_yields_single_node_network() {
    let network = build(triangle(0.5));
    let sub = network.extract_sub_network(2).expect("node 2 exists");
    assert_eq!(sub.node_count(), 1);
    assert!(sub.edges().is_empty());
    assert_eq!(sub.node_names(), vec!["3"]);
}

/// Absolute cutoff that also drops every link of the highest-indexed node.
#[derive(Debug)]
struct IgnoreLastNode;

impl ThresholdPolicy for IgnoreLastNode {
    fn name(&self) -> &str {
        "ignore-last-node"
    }

    fn default_params(&self) -> Vec<f64> {
        vec![0.5]
    }

    fn param_labels(&self) -> Vec<String> {
        vec!["cutoff".to_owned()]
    }

    fn apply(&self, matrix: &Matrix, params: &[f64]) -> Matrix {
        let last = matrix.dim().saturating_sub(1);
        AbsoluteCutoff
            .apply(matrix, params)
            .map_indexed(|row, col, value| if row == last || col == last { f64::NAN } else { value })
    }
}

#[test]
fn sub_network_keeps_members_its_threshold_disconnects() {
    let network = build(
        chain()
            .with_threshold_policy(Arc::new(IgnoreLastNode))
            .with_pruning(true),
    );
    assert_eq!(network.parent_of(3), None);

    let sub = network.extract_sub_network(1).expect("node 1 exists");
    assert_eq!(sub.node_count(), 3);
    assert_eq!(edge_pairs(&sub), vec![(0, 1)]);
    assert!(!sub.pruning());
    assert!(sub.parent_of(2).is_some());
    assert_eq!(memberships(&sub), vec![vec![0, 1, 2]]);
}

#[rstest]
#[case(4)]
#[case(usize::MAX)]
fn rejects_unknown_root(#[case] root: usize) {
    let network = build(chain());
    let err = network
        .extract_sub_network(root)
        .expect_err("root must be rejected");
    assert_eq!(
        err,
        NetworkError::IndexOutOfRange {
            target: "node",
            index: root,
            len: 4,
        }
    );
}
