//! Property tests for thresholding, flattening, pruning and extraction.

use std::sync::Arc;

use dendronet_core::{AbsoluteCutoff, Linkage, Network, NetworkBuilder};
use dendronet_test_support::proptest_profile::ProptestRunProfile;
use proptest::{
    prelude::{Just, Strategy, any},
    prop_assert, prop_assert_eq, proptest,
    test_runner::Config as ProptestConfig,
};

fn config() -> ProptestConfig {
    let profile = ProptestRunProfile::load(64, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

#[derive(Clone, Debug)]
struct Fixture {
    rows: Vec<Vec<f64>>,
    linkage: Vec<Vec<f64>>,
    cutoff: f64,
}

impl Fixture {
    fn builder(&self) -> NetworkBuilder {
        let linkage = Linkage::try_from_rows(self.linkage.clone())
            .expect("generated linkage must decode");
        NetworkBuilder::new()
            .with_name("generated")
            .with_matrix("w", self.rows.clone())
            .with_linkage(linkage)
            .with_threshold_policy(Arc::new(AbsoluteCutoff))
            .with_threshold_params(vec![self.cutoff])
            .with_num_clusters(self.rows.len())
    }

    fn network(&self) -> Network {
        self.builder().build().expect("generated network must build")
    }
}

fn symmetric(n: usize, upper: &[f64]) -> Vec<Vec<f64>> {
    let mut rows = vec![vec![0.0; n]; n];
    let mut values = upper.iter().copied();
    for i in 0..n {
        for j in (i + 1)..n {
            let value = values.next().unwrap_or(0.0);
            rows[i][j] = value;
            rows[j][i] = value;
        }
    }
    rows
}

/// Merges two live clusters per row, picked by the seeds, at rising heights.
fn linkage_rows(n: usize, seeds: &[(usize, usize, f64)]) -> Vec<Vec<f64>> {
    let mut live: Vec<usize> = (1..=n).collect();
    let mut height = 0.0;
    let mut rows = Vec::new();
    for (row, &(a, b, step)) in seeds.iter().enumerate() {
        if live.len() < 2 {
            break;
        }
        let left = live.remove(a % live.len());
        let right = live.remove(b % live.len());
        height += step;
        rows.push(vec![left as f64, right as f64, height]);
        live.push(n + row + 1);
    }
    rows
}

fn fixture_strategy() -> impl Strategy<Value = Fixture> {
    (2_usize..9)
        .prop_flat_map(|n| {
            let pairs = n * (n - 1) / 2;
            (
                Just(n),
                proptest::collection::vec(-1.0_f64..1.0, pairs),
                proptest::collection::vec((any::<usize>(), any::<usize>(), 0.0_f64..1.0), n - 1),
                0.0_f64..1.0,
            )
        })
        .prop_map(|(n, upper, seeds, cutoff)| Fixture {
            rows: symmetric(n, &upper),
            linkage: linkage_rows(n, &seeds),
            cutoff,
        })
}

fn memberships(network: &Network) -> Vec<Vec<usize>> {
    network
        .clusters()
        .into_iter()
        .map(|cluster| cluster.members)
        .collect()
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn edges_are_symmetric_without_self_loops(fixture in fixture_strategy()) {
        let network = fixture.network();
        for edge in network.edges() {
            prop_assert!(edge.i() < edge.j());
            prop_assert!(network.nodes()[edge.i()].neighbours().contains(&edge.j()));
            prop_assert!(network.nodes()[edge.j()].neighbours().contains(&edge.i()));
        }
        let degree: usize = network.nodes().iter().map(|node| node.neighbours().len()).sum();
        prop_assert_eq!(degree, network.edges().len() * 2);
    }

    #[test]
    fn rebuilding_edges_is_idempotent(fixture in fixture_strategy()) {
        let mut network = fixture.network();
        let first = network.edges().to_vec();
        network.build_edges().expect("edges rebuild");
        prop_assert_eq!(network.edges(), first.as_slice());
    }

    #[test]
    fn flatten_is_idempotent(fixture in fixture_strategy(), k in 1_usize..9) {
        let mut network = fixture.network();
        network.flatten_tree(k);
        let once = network.tree().clone();
        network.flatten_tree(k);
        prop_assert_eq!(network.tree(), &once);
        prop_assert!(network.clusters().len() <= k.max(1));
    }

    #[test]
    fn fewer_clusters_coarsen_more(fixture in fixture_strategy(), a in 1_usize..9, b in 1_usize..9) {
        let (coarse_k, fine_k) = if a <= b { (a, b) } else { (b, a) };
        let mut coarse = fixture.network();
        coarse.set_num_clusters(coarse_k).expect("clusters accepted");
        let mut fine = fixture.network();
        fine.set_num_clusters(fine_k).expect("clusters accepted");
        let coarse_sets = memberships(&coarse);
        for members in memberships(&fine) {
            let containing = coarse_sets
                .iter()
                .filter(|set| members.iter().all(|node| set.contains(node)))
                .count();
            prop_assert_eq!(containing, 1);
        }
    }

    #[test]
    fn flattening_to_one_leaves_one_cluster(fixture in fixture_strategy()) {
        let mut network = fixture.network();
        network.set_num_clusters(1).expect("clusters accepted");
        prop_assert_eq!(network.clusters().len(), 1);
        prop_assert_eq!(network.clusters()[0].members.len(), network.node_count());
    }

    #[test]
    fn pruning_removes_exactly_disconnected_nodes(fixture in fixture_strategy()) {
        let mut network = fixture.network();
        let mut all = network.tree().leaf_order();
        all.sort_unstable();
        prop_assert_eq!(all, (0..network.node_count()).collect::<Vec<_>>());

        let edges = network.edges().to_vec();
        network.set_pruning_state(true).expect("pruning toggles");
        let mut reachable = network.tree().leaf_order();
        reachable.sort_unstable();
        let connected: Vec<usize> = network
            .nodes()
            .iter()
            .filter(|node| !node.is_disconnected())
            .map(|node| node.index())
            .collect();
        prop_assert_eq!(reachable, connected);
        prop_assert_eq!(network.edges(), edges.as_slice());
    }

    #[test]
    fn sub_network_restricts_parent(fixture in fixture_strategy(), pick in any::<usize>()) {
        let network = fixture.network();
        let root = pick % network.node_count();
        let sub = network.extract_sub_network(root).expect("root exists");
        let degree = network.nodes()[root].neighbours().len();
        prop_assert_eq!(sub.node_count(), degree + 1);

        let origin: Vec<usize> = sub
            .nodes()
            .iter()
            .map(|node| node.full_net_index().expect("sub nodes record their origin"))
            .collect();
        prop_assert!(origin.contains(&root));
        prop_assert!(origin.windows(2).all(|pair| pair[0] < pair[1]));
        let parent = network.matrix(0).expect("matrix exists");
        let child = sub.matrix(0).expect("matrix exists");
        for (row, &i) in origin.iter().enumerate() {
            for (col, &j) in origin.iter().enumerate() {
                prop_assert_eq!(child.get(row, col), parent.get(i, j));
            }
        }
    }
}
