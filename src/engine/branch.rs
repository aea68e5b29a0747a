//! The branch engine: spec.md §4.4.

use streaming_iterator::StreamingIterator;

use crate::ids::NodeId;
use crate::naive_windowing::windowed_tree_stat;
use crate::sequence::TreeSequence;
use crate::weights::{SummaryFn, WeightMatrix};

fn area_weighted_summary(
    u: NodeId,
    state: &[Vec<f64>],
    parent: &[NodeId],
    time: &[f64],
    total_weight: &[f64],
    polarised: bool,
    f: &SummaryFn,
) -> Vec<f64> {
    let v = parent[u.as_usize()];
    let branch_length = if v.is_null() {
        0.0
    } else {
        time[v.as_usize()] - time[u.as_usize()]
    };
    let mut s = f(&state[u.as_usize()]);
    if !polarised {
        let complement: Vec<f64> = total_weight
            .iter()
            .zip(&state[u.as_usize()])
            .map(|(t, x)| t - x)
            .collect();
        for (a, b) in s.iter_mut().zip(f(&complement)) {
            *a += b;
        }
    }
    for x in s.iter_mut() {
        *x *= branch_length;
    }
    s
}

/// Efficient, incremental implementation: maintains `running_sum = sum_u
/// A(u)` across edge-diffs and deposits it into each window by overlap,
/// per spec.md §4.4.
pub fn general_branch_stat(
    ts: &TreeSequence,
    weights: &WeightMatrix,
    f: &SummaryFn,
    windows: &[f64],
    polarised: bool,
    span_normalise: bool,
) -> Vec<Vec<f64>> {
    let result_dim = f(weights.row(0)).len();
    let num_windows = windows.len() - 1;
    let mut result = vec![vec![0.0; result_dim]; num_windows];

    let num_nodes = ts.num_nodes();
    let mut state: Vec<Vec<f64>> = vec![vec![0.0; weights.k()]; num_nodes];
    for (i, &sample) in ts.samples().iter().enumerate() {
        state[sample.as_usize()] = weights.row(i).to_vec();
    }
    let total_weight = weights.total();
    let time: Vec<f64> = ts.nodes().iter().map(|n| n.time).collect();
    let mut parent = vec![NodeId::NULL; num_nodes];
    let mut running_sum = vec![0.0; result_dim];

    let summary = |u: NodeId, state: &[Vec<f64>], parent: &[NodeId]| {
        area_weighted_summary(u, state, parent, &time, &total_weight, polarised, f)
    };

    let mut window_index = 0usize;
    let mut diffs = ts.edge_diffs();
    while let Some(diff) = diffs.next() {
        let (t_left, t_right) = diff.interval;

        for edge in &diff.edges_out {
            let u = edge.child;
            let contribution = summary(u, &state, &parent);
            for (r, c) in running_sum.iter_mut().zip(&contribution) {
                *r -= c;
            }
            let mut u = edge.parent;
            while !u.is_null() {
                let before = summary(u, &state, &parent);
                for (r, c) in running_sum.iter_mut().zip(&before) {
                    *r -= c;
                }
                let child_state = state[edge.child.as_usize()].clone();
                for (s, c) in state[u.as_usize()].iter_mut().zip(&child_state) {
                    *s -= c;
                }
                let after = summary(u, &state, &parent);
                for (r, c) in running_sum.iter_mut().zip(&after) {
                    *r += c;
                }
                u = parent[u.as_usize()];
            }
            parent[edge.child.as_usize()] = NodeId::NULL;
        }

        for edge in &diff.edges_in {
            parent[edge.child.as_usize()] = edge.parent;
            let u = edge.child;
            let contribution = summary(u, &state, &parent);
            for (r, c) in running_sum.iter_mut().zip(&contribution) {
                *r += c;
            }
            let mut u = edge.parent;
            while !u.is_null() {
                let before = summary(u, &state, &parent);
                for (r, c) in running_sum.iter_mut().zip(&before) {
                    *r -= c;
                }
                let child_state = state[edge.child.as_usize()].clone();
                for (s, c) in state[u.as_usize()].iter_mut().zip(&child_state) {
                    *s += c;
                }
                let after = summary(u, &state, &parent);
                for (r, c) in running_sum.iter_mut().zip(&after) {
                    *r += c;
                }
                u = parent[u.as_usize()];
            }
        }

        while window_index < num_windows && windows[window_index] < t_right {
            let w_left = windows[window_index];
            let w_right = windows[window_index + 1];
            let left = t_left.max(w_left);
            let right = t_right.min(w_right);
            let weight = right - left;
            for (r, s) in result[window_index].iter_mut().zip(&running_sum) {
                *r += s * weight;
            }
            if w_right <= t_right {
                window_index += 1;
            } else {
                break;
            }
        }
    }

    if span_normalise {
        for (j, row) in result.iter_mut().enumerate() {
            let length = windows[j + 1] - windows[j];
            for v in row.iter_mut() {
                *v /= length;
            }
        }
    }
    result
}

/// Per-tree-from-scratch reference, used only for cross-checking: spec.md
/// §4.9.
pub fn naive_branch_stat(
    ts: &TreeSequence,
    weights: &WeightMatrix,
    f: &SummaryFn,
    windows: &[f64],
    polarised: bool,
    span_normalise: bool,
) -> Vec<Vec<f64>> {
    let result_dim = f(weights.row(0)).len();
    let total_weight = weights.total();
    let breakpoints = ts.breakpoints();
    let num_trees = ts.num_trees();

    let mut per_tree = vec![vec![0.0; result_dim]; num_trees];
    let mut state: Vec<Vec<f64>> = vec![vec![0.0; weights.k()]; ts.num_nodes()];
    let mut parent = vec![NodeId::NULL; ts.num_nodes()];
    let time: Vec<f64> = ts.nodes().iter().map(|n| n.time).collect();

    for (i, &sample) in ts.samples().iter().enumerate() {
        state[sample.as_usize()] = weights.row(i).to_vec();
    }

    let mut diffs = ts.edge_diffs();
    let mut tree_index = 0usize;
    while let Some(diff) = diffs.next() {
        for edge in &diff.edges_out {
            let child = state[edge.child.as_usize()].clone();
            for (s, c) in state[edge.parent.as_usize()].iter_mut().zip(&child) {
                *s -= c;
            }
            parent[edge.child.as_usize()] = NodeId::NULL;
        }
        for edge in &diff.edges_in {
            parent[edge.child.as_usize()] = edge.parent;
            let child = state[edge.child.as_usize()].clone();
            for (s, c) in state[edge.parent.as_usize()].iter_mut().zip(&child) {
                *s += c;
            }
        }

        let span = diff.interval.1 - diff.interval.0;
        let mut s = vec![0.0; result_dim];
        for u in 0..ts.num_nodes() {
            let v = parent[u];
            if v.is_null() {
                continue;
            }
            let branch_length = time[v.as_usize()] - time[u];
            let mut contribution = f(&state[u]);
            if !polarised {
                let complement: Vec<f64> = total_weight
                    .iter()
                    .zip(&state[u])
                    .map(|(t, x)| t - x)
                    .collect();
                for (a, b) in contribution.iter_mut().zip(f(&complement)) {
                    *a += b;
                }
            }
            for x in contribution.iter_mut() {
                *x *= branch_length;
            }
            for (a, b) in s.iter_mut().zip(&contribution) {
                *a += b;
            }
        }
        for x in s.iter_mut() {
            *x *= span;
        }
        per_tree[tree_index] = s;
        tree_index += 1;
    }

    windowed_tree_stat(breakpoints, &per_tree, windows, span_normalise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{NodeFlags, TableCollection};

    /// The single tree from spec.md scenario S1:
    /// `((0,2):0.4 over [0.2,0.8); (1,(0,2)):0.1 over [0.2,0.8))`, recoordinated
    /// to span a sequence of length 0.6 starting at 0.
    fn s1_single_tree() -> TreeSequence {
        let mut tables = TableCollection::new(0.6).unwrap();
        let s0 = tables.add_node(NodeFlags::new_sample(), 0.0);
        let s1 = tables.add_node(NodeFlags::new_sample(), 0.0);
        let s2 = tables.add_node(NodeFlags::new_sample(), 0.0);
        let a = tables.add_node(NodeFlags::default(), 0.4);
        let b = tables.add_node(NodeFlags::default(), 0.5);
        tables.add_edge(0.0, 0.6, a, s0).unwrap();
        tables.add_edge(0.0, 0.6, a, s2).unwrap();
        tables.add_edge(0.0, 0.6, b, s1).unwrap();
        tables.add_edge(0.0, 0.6, b, a).unwrap();
        tables.tree_sequence().unwrap()
    }

    /// Branch divergence between two singleton sample sets equals the tree
    /// path length between the two samples: for S1's tree, 0 -> a (0.4) ->
    /// b (0.1) <- 1 (0.5), so path_length(0, 1) = 1.0.
    #[test]
    fn s1_pairwise_divergence_between_0_and_1() {
        let ts = s1_single_tree();
        let weights = WeightMatrix::indicator(3, &[vec![0], vec![1]]);
        let f = |x: &[f64]| vec![x[0] * (1.0 - x[1])];
        let windows = vec![0.0, 0.6];
        let result = general_branch_stat(&ts, &weights, &f, &windows, false, false);
        assert!((result[0][0] - 1.0).abs() < 1e-8, "got {}", result[0][0]);
    }

    #[test]
    fn zero_weights_give_zero_output() {
        let ts = s1_single_tree();
        let weights = WeightMatrix::from_rows(vec![vec![0.0]; 3]);
        let f = |x: &[f64]| vec![x[0]];
        let windows = vec![0.0, 0.6];
        let result = general_branch_stat(&ts, &weights, &f, &windows, true, true);
        assert_eq!(result, vec![vec![0.0]]);
    }

    /// A tree sequence with two distinct trees, to exercise edge-diff
    /// transitions (and not just a single static tree) in the
    /// naive/incremental cross-check below.
    fn two_tree_sequence() -> TreeSequence {
        let mut tables = TableCollection::new(1.0).unwrap();
        let s0 = tables.add_node(NodeFlags::new_sample(), 0.0);
        let s1 = tables.add_node(NodeFlags::new_sample(), 0.0);
        let s2 = tables.add_node(NodeFlags::new_sample(), 0.0);
        let a = tables.add_node(NodeFlags::default(), 0.4);
        let b = tables.add_node(NodeFlags::default(), 0.5);
        let c = tables.add_node(NodeFlags::default(), 0.6);

        // [0, 0.3): ((0,2):0.4; (1,(0,2)):0.1)
        tables.add_edge(0.0, 0.3, a, s0).unwrap();
        tables.add_edge(0.0, 0.3, a, s2).unwrap();
        tables.add_edge(0.0, 0.3, b, s1).unwrap();
        tables.add_edge(0.0, 0.3, b, a).unwrap();

        // [0.3, 1.0): ((0,1):0.6; (2,(0,1)) via c) -- different topology
        tables.add_edge(0.3, 1.0, c, s0).unwrap();
        tables.add_edge(0.3, 1.0, c, s1).unwrap();

        tables.tree_sequence().unwrap()
    }

    #[test]
    fn naive_and_incremental_agree() {
        let ts = two_tree_sequence();
        let weights = WeightMatrix::indicator(3, &[vec![0], vec![1], vec![2]]);
        let f = |x: &[f64]| vec![x[0] * x[1] + x[1] * x[2]];
        let windows = vec![0.0, 0.3, 1.0];
        for polarised in [true, false] {
            for span_normalise in [true, false] {
                let incremental =
                    general_branch_stat(&ts, &weights, &f, &windows, polarised, span_normalise);
                let naive =
                    naive_branch_stat(&ts, &weights, &f, &windows, polarised, span_normalise);
                for (a, b) in incremental.iter().zip(&naive) {
                    for (x, y) in a.iter().zip(b) {
                        assert!((x - y).abs() < 1e-8, "{x} vs {y}");
                    }
                }
            }
        }
    }
}
