//! Tests for network construction, derived state and setters.

mod common;

use std::sync::Arc;

use common::{build, chain, edge_pairs, memberships, pairs_linkage, triangle};
use dendronet_core::{
    AbsoluteCutoff, Network, NetworkBuilder, NetworkError, RowPercentileCutoff, WeightRange,
};
use dendronet_test_support::tracing::RecordingLayer;
use rstest::rstest;

#[test]
fn drops_weak_pairs_and_prunes_isolated_node() {
    let mut network = build(triangle(0.5));
    assert_eq!(edge_pairs(&network), vec![(0, 1)]);
    assert_eq!(network.edges()[0].weights(), &[0.9]);
    assert!(network.nodes()[2].neighbours().is_empty());
    assert!(network.parent_of(2).is_some());

    network.set_pruning_state(true).expect("pruning toggles");
    assert_eq!(network.parent_of(2), None);
    assert!(network.parent_of(0).is_some());
    assert_eq!(edge_pairs(&network), vec![(0, 1)]);
}

#[test]
fn flattens_pairs_linkage_into_two_clusters() {
    let mut network = build(
        NetworkBuilder::new()
            .with_matrix("w", vec![vec![1.0; 4]; 4])
            .with_linkage(pairs_linkage())
            .with_threshold_policy(Arc::new(AbsoluteCutoff))
            .with_num_clusters(4),
    );
    network.flatten_tree(2);
    assert_eq!(memberships(&network), vec![vec![0, 1], vec![2, 3]]);
}

#[test]
fn edges_collect_weights_from_every_matrix() {
    let network = build(chain());
    assert_eq!(edge_pairs(&network), vec![(0, 1), (1, 2), (2, 3)]);
    let edge = &network.edges()[1];
    assert_eq!(edge.weights(), &[0.7, -0.7]);
    assert_eq!(network.nodes()[1].neighbours(), &[0, 2]);
    assert_eq!(network.nodes()[1].edges(), &[0, 1]);
}

#[test]
fn rebuilding_edges_is_deterministic() {
    let mut network = build(chain());
    let before = network.edges().to_vec();
    network.build_edges().expect("edges rebuild");
    network.build_edges().expect("edges rebuild");
    assert_eq!(network.edges(), before.as_slice());
}

#[test]
fn weight_stats_cover_current_edges() {
    let mut network = build(chain());
    assert_eq!(
        network.weight_stats(),
        &[
            Some(WeightRange {
                min: 0.6,
                max: 0.8,
                abs_min: 0.6,
                abs_max: 0.8,
            }),
            Some(WeightRange {
                min: -0.8,
                max: -0.6,
                abs_min: 0.6,
                abs_max: 0.8,
            }),
        ]
    );
    network.set_threshold_value(0, 2.0).expect("parameter exists");
    assert!(network.edges().is_empty());
    assert_eq!(network.weight_stats(), &[None, None]);
}

#[test]
fn scale_config_is_fixed_at_first_build() {
    let mut network = build(chain());
    let scale = Arc::clone(network.scale_config());
    network.set_threshold_value(0, 0.0).expect("parameter exists");
    assert!(Arc::ptr_eq(&scale, network.scale_config()));
    assert_eq!(scale.range(0).map(|range| range.min), Some(0.6));
}

#[test]
fn threshold_on_second_matrix_uses_its_values() {
    let mut network = build(chain());
    network.set_threshold_idx(1).expect("second matrix exists");
    assert_eq!(network.threshold_idx(), 1);
    assert_eq!(edge_pairs(&network), vec![(0, 1), (1, 2), (2, 3)]);

    network.set_threshold_value(0, 0.65).expect("parameter exists");
    assert_eq!(edge_pairs(&network), vec![(0, 1), (1, 2)]);
    assert_eq!(network.threshold_params(), &[0.65]);
}

#[test]
fn cluster_count_can_be_raised_again() {
    let mut network = build(chain());
    assert_eq!(memberships(&network), vec![vec![0, 1], vec![2, 3]]);
    network.set_num_clusters(1).expect("clusters accepted");
    assert_eq!(memberships(&network), vec![vec![0, 1, 2, 3]]);
    network.set_num_clusters(2).expect("clusters accepted");
    assert_eq!(memberships(&network), vec![vec![0, 1], vec![2, 3]]);
    network.set_num_clusters(0).expect("clusters accepted");
    assert_eq!(network.clusters().len(), 1);
}

#[test]
fn unpruning_restores_every_leaf() {
    let mut network = build(triangle(0.5).with_pruning(true));
    assert_eq!(network.parent_of(2), None);
    network.set_pruning_state(false).expect("pruning toggles");
    assert!((0..3).all(|node| network.parent_of(node).is_some()));
    assert_eq!(network.tree().leaf_order(), vec![0, 1, 2]);
}

#[test]
fn pruning_repeats_after_rethresholding() {
    let mut network = build(chain().with_pruning(true));
    assert!((0..4).all(|node| network.parent_of(node).is_some()));
    network.set_threshold_value(0, 0.75).expect("parameter exists");
    assert_eq!(edge_pairs(&network), vec![(0, 1)]);
    assert_eq!(network.parent_of(2), None);
    assert_eq!(network.parent_of(3), None);
    assert_eq!(memberships(&network), vec![vec![0, 1]]);
}

#[rstest]
#[case::threshold_idx(|n: &mut Network| n.set_threshold_idx(2))]
#[case::threshold_value(|n: &mut Network| n.set_threshold_value(1, 0.1))]
#[case::node_order(|n: &mut Network| n.set_node_order_idx(Some(2)))]
#[case::node_name(|n: &mut Network| n.set_node_name_idx(Some(1)))]
#[case::edge_colour(|n: &mut Network| n.set_edge_colour_idx(2))]
#[case::edge_width(|n: &mut Network| n.set_edge_width_idx(5))]
#[case::node_colour(|n: &mut Network| n.set_node_colour_idx(Some(1)))]
fn setters_reject_out_of_range_without_mutation(
    #[case] setter: fn(&mut Network) -> dendronet_core::Result<()>,
) {
    let mut network = build(chain());
    let edges = network.edges().to_vec();
    let clusters = network.clusters();
    let params = network.threshold_params().to_vec();
    let err = setter(&mut network).expect_err("setter must reject index");
    assert!(matches!(err, NetworkError::IndexOutOfRange { .. }));
    assert_eq!(network.edges(), edges.as_slice());
    assert_eq!(network.clusters(), clusters);
    assert_eq!(network.threshold_params(), params.as_slice());
    assert_eq!(network.threshold_idx(), 0);
    assert_eq!(network.node_order_idx(), None);
    assert_eq!(network.node_name_idx(), None);
    assert_eq!(network.edge_colour_idx(), 0);
    assert_eq!(network.node_colour_idx(), None);
}

#[test]
fn index_setters_store_selection() {
    let mut network = build(chain());
    network.set_edge_colour_idx(1).expect("matrix exists");
    network.set_edge_width_idx(1).expect("matrix exists");
    network.set_node_colour_idx(Some(0)).expect("node data exists");
    assert_eq!(network.edge_colour_idx(), 1);
    assert_eq!(network.edge_width_idx(), 1);
    assert_eq!(network.node_colour_idx(), Some(0));
}

#[test]
fn node_names_default_to_one_based_index() {
    let mut network = build(chain());
    assert_eq!(network.node_names(), vec!["1", "2", "3", "4"]);
    network.set_node_name_idx(Some(0)).expect("names exist");
    assert_eq!(network.node_name(2).as_deref(), Some("c"));
    assert_eq!(network.node_name(4), None);
}

#[test]
fn display_order_follows_selected_array_or_tree() {
    let mut network = build(chain());
    assert_eq!(network.display_order(), vec![0, 1, 2, 3]);
    network.set_node_order_idx(Some(0)).expect("order exists");
    assert_eq!(network.display_order(), vec![3, 2, 1, 0]);
    network.set_node_order_idx(Some(1)).expect("order exists");
    assert_eq!(network.display_order(), vec![0, 2, 3, 1]);
}

#[test]
fn display_order_appends_pruned_nodes() {
    let network = build(triangle(0.5).with_pruning(true));
    assert_eq!(network.tree().leaf_order(), vec![0, 1]);
    assert_eq!(network.display_order(), vec![0, 1, 2]);
}

#[test]
fn thumbnails_are_zero_padded() {
    let network = build(chain());
    assert_eq!(network.thumbnail(3).as_deref(), Some("thumbs/0003.png"));
    assert_eq!(network.thumbnail(9), None);
    assert_eq!(build(triangle(0.5)).thumbnail(0), None);
}

#[test]
fn row_percentile_policy_uses_default_fraction() {
    let network = build(
        NetworkBuilder::new()
            .with_matrix("w", common::chain_rows())
            .with_threshold_policy(Arc::new(RowPercentileCutoff)),
    );
    assert_eq!(network.threshold_params(), &[0.75]);
    // Row 0 peaks at 0.8, so its 0.3 link to node 3 falls below 0.6.
    assert_eq!(edge_pairs(&network), vec![(0, 1), (1, 2), (2, 3)]);
}

#[test]
fn build_records_instrumentation() {
    let (network, layer) = RecordingLayer::capture(|| chain().build());
    let network = network.expect("chain builds");
    let span = layer
        .span("core.build_network")
        .expect("core.build_network span must exist");
    assert_eq!(span.field("network"), Some("chain"));
    assert_eq!(span.field("matrices"), Some("2"));

    let built = layer.events_with_message("network built");
    let event = built.first().expect("build event must be emitted");
    assert_eq!(event.field("edges"), Some("3"));
    assert_eq!(event.field("clusters"), Some("2"));
    assert_eq!(network.node_count(), 4);
}

#[test]
fn setters_record_spans() {
    let mut network = build(chain());
    let (result, layer) = RecordingLayer::capture(|| network.set_threshold_idx(1));
    result.expect("second matrix exists");
    let span = layer
        .span("core.set_threshold_idx")
        .expect("setter span must exist");
    assert_eq!(span.field("network"), Some("chain"));
    assert_eq!(span.field("idx"), Some("1"));
}
