//! Shared fixture generator for the integration tests: a simple
//! Kingman-coalescent-style random merge process, always producing a valid
//! single-tree tree sequence spanning `[0, sequence_length)`. Grounded in the
//! teacher's own `test_data` simulation helper's use of `rand` for generating
//! arbitrary test topologies, simplified to a single-tree generator since the
//! property tests below don't need recombination to exercise the engines.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use tree_stats::{NodeFlags, NodeId, TableCollection, TreeSequence};

/// Coalescent waiting times are exponential; `rate` grows as `C(k, 2)` the
/// way a Kingman coalescent's merge rate does for `k` remaining lineages.
fn coalescent_waiting_time(rng: &mut StdRng, num_lineages: usize) -> f64 {
    let k = num_lineages as f64;
    let rate = k * (k - 1.0) / 2.0;
    Exp::new(rate.max(1e-9)).unwrap().sample(rng)
}

pub fn random_tree_sequence(num_samples: usize, sequence_length: f64, seed: u64) -> TreeSequence {
    assert!(num_samples >= 2, "need at least two samples to coalesce");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tables = TableCollection::new(sequence_length).unwrap();

    let mut roots: Vec<NodeId> = (0..num_samples)
        .map(|_| tables.add_node(NodeFlags::new_sample(), 0.0))
        .collect();

    let mut time = 0.0f64;
    while roots.len() > 1 {
        use rand::Rng;
        let i = rng.gen_range(0..roots.len());
        let a = roots.swap_remove(i);
        let j = rng.gen_range(0..roots.len());
        let b = roots.swap_remove(j);
        time += coalescent_waiting_time(&mut rng, roots.len() + 1);
        let parent = tables.add_node(NodeFlags::default(), time);
        tables.add_edge(0.0, sequence_length, parent, a).unwrap();
        tables.add_edge(0.0, sequence_length, parent, b).unwrap();
        roots.push(parent);
    }

    tables.tree_sequence().unwrap()
}

/// Same idea, but splits the sequence into two intervals with independently
/// shuffled topologies, so the edge-diff stream has more than one tree.
pub fn random_two_tree_sequence(num_samples: usize, sequence_length: f64, seed: u64) -> TreeSequence {
    assert!(num_samples >= 2);
    let mut rng = StdRng::seed_from_u64(seed);
    let mid = sequence_length / 2.0;
    let mut tables = TableCollection::new(sequence_length).unwrap();

    let samples: Vec<NodeId> = (0..num_samples)
        .map(|_| tables.add_node(NodeFlags::new_sample(), 0.0))
        .collect();

    for &(left, right) in &[(0.0, mid), (mid, sequence_length)] {
        use rand::Rng;
        let mut roots = samples.clone();
        let mut time = 0.0f64;
        while roots.len() > 1 {
            let i = rng.gen_range(0..roots.len());
            let a = roots.swap_remove(i);
            let j = rng.gen_range(0..roots.len());
            let b = roots.swap_remove(j);
            time += rng.gen_range(0.01..1.0);
            let parent = tables.add_node(NodeFlags::default(), time);
            tables.add_edge(left, right, parent, a).unwrap();
            tables.add_edge(left, right, parent, b).unwrap();
            roots.push(parent);
        }
    }

    tables.tree_sequence().unwrap()
}
