//! The node engine: spec.md §4.6.
//!
//! Unlike the branch and site engines, the node engine's output is shaped
//! `[W][N][M]`: one summary vector per window *per node*. It tracks a
//! "last-update" watermark per node and deposits `(position − lastUpdate[u])
//! · currentSummary[u]` into the running result every time `S[u]` is about
//! to change, or a window boundary is crossed.

use streaming_iterator::StreamingIterator;

use crate::ids::NodeId;
use crate::naive_windowing::windowed_tree_stat;
use crate::sequence::TreeSequence;
use crate::weights::{SummaryFn, WeightMatrix};

fn evaluate_summary(node_state: &[f64], total_weight: &[f64], polarised: bool, f: &SummaryFn) -> Vec<f64> {
    let mut s = f(node_state);
    if !polarised {
        let complement: Vec<f64> = total_weight
            .iter()
            .zip(node_state)
            .map(|(t, x)| t - x)
            .collect();
        for (a, b) in s.iter_mut().zip(f(&complement)) {
            *a += b;
        }
    }
    s
}

/// Deposits the watermark contribution for node `u` up to `position`, then
/// applies `delta` (added if `add`, subtracted otherwise) to `state[u]` and
/// recomputes `current_summary[u]`.
#[allow(clippy::too_many_arguments)]
fn update_node(
    u: NodeId,
    delta: &[f64],
    add: bool,
    position: f64,
    polarised: bool,
    f: &SummaryFn,
    total_weight: &[f64],
    state: &mut [Vec<f64>],
    current_summary: &mut [Vec<f64>],
    last_update: &mut [f64],
    result: &mut [Vec<Vec<f64>>],
    window_index: usize,
) {
    let idx = u.as_usize();
    let amount = position - last_update[idx];
    for (r, s) in result[window_index][idx].iter_mut().zip(&current_summary[idx]) {
        *r += s * amount;
    }
    last_update[idx] = position;
    if add {
        for (s, d) in state[idx].iter_mut().zip(delta) {
            *s += d;
        }
    } else {
        for (s, d) in state[idx].iter_mut().zip(delta) {
            *s -= d;
        }
    }
    current_summary[idx] = evaluate_summary(&state[idx], total_weight, polarised, f);
}

fn flush_to_boundary(
    boundary: f64,
    num_nodes: usize,
    current_summary: &[Vec<f64>],
    last_update: &mut [f64],
    result: &mut [Vec<Vec<f64>>],
    window_index: usize,
) {
    for u in 0..num_nodes {
        let amount = boundary - last_update[u];
        for (r, s) in result[window_index][u].iter_mut().zip(&current_summary[u]) {
            *r += s * amount;
        }
        last_update[u] = boundary;
    }
}

/// Efficient implementation, per spec.md §4.6.
pub fn general_node_stat(
    ts: &TreeSequence,
    weights: &WeightMatrix,
    f: &SummaryFn,
    windows: &[f64],
    polarised: bool,
    span_normalise: bool,
) -> Vec<Vec<Vec<f64>>> {
    let result_dim = f(weights.row(0)).len();
    let num_windows = windows.len() - 1;
    let num_nodes = ts.num_nodes();
    let mut result = vec![vec![vec![0.0; result_dim]; num_nodes]; num_windows];

    let mut state: Vec<Vec<f64>> = vec![vec![0.0; weights.k()]; num_nodes];
    for (i, &sample) in ts.samples().iter().enumerate() {
        state[sample.as_usize()] = weights.row(i).to_vec();
    }
    let total_weight = weights.total();
    let mut parent = vec![NodeId::NULL; num_nodes];

    let mut current_summary: Vec<Vec<f64>> = (0..num_nodes)
        .map(|u| evaluate_summary(&state[u], &total_weight, polarised, f))
        .collect();
    let mut last_update = vec![windows[0]; num_nodes];
    let mut window_index = 0usize;

    let mut diffs = ts.edge_diffs();
    while let Some(diff) = diffs.next() {
        let (t_left, t_right) = diff.interval;

        for edge in &diff.edges_out {
            let child_state = state[edge.child.as_usize()].clone();
            let mut u = edge.parent;
            while !u.is_null() {
                update_node(
                    u,
                    &child_state,
                    false,
                    t_left,
                    polarised,
                    f,
                    &total_weight,
                    &mut state,
                    &mut current_summary,
                    &mut last_update,
                    &mut result,
                    window_index,
                );
                u = parent[u.as_usize()];
            }
            parent[edge.child.as_usize()] = NodeId::NULL;
        }

        for edge in &diff.edges_in {
            parent[edge.child.as_usize()] = edge.parent;
            let child_state = state[edge.child.as_usize()].clone();
            let mut u = edge.parent;
            while !u.is_null() {
                update_node(
                    u,
                    &child_state,
                    true,
                    t_left,
                    polarised,
                    f,
                    &total_weight,
                    &mut state,
                    &mut current_summary,
                    &mut last_update,
                    &mut result,
                    window_index,
                );
                u = parent[u.as_usize()];
            }
        }

        while window_index < num_windows && windows[window_index + 1] <= t_right {
            flush_to_boundary(
                windows[window_index + 1],
                num_nodes,
                &current_summary,
                &mut last_update,
                &mut result,
                window_index,
            );
            window_index += 1;
        }
    }

    if span_normalise {
        for (w, window_rows) in result.iter_mut().enumerate() {
            let length = windows[w + 1] - windows[w];
            for row in window_rows.iter_mut() {
                for v in row.iter_mut() {
                    *v /= length;
                }
            }
        }
    }
    result
}

/// Per-tree-from-scratch reference, used only for cross-checking: spec.md
/// §4.9. Recomputes every node's summary fresh each tree and folds the
/// `N * M`-flattened per-tree values into windows with the same overlap
/// arithmetic used by the naive branch engine.
pub fn naive_node_stat(
    ts: &TreeSequence,
    weights: &WeightMatrix,
    f: &SummaryFn,
    windows: &[f64],
    polarised: bool,
    span_normalise: bool,
) -> Vec<Vec<Vec<f64>>> {
    let result_dim = f(weights.row(0)).len();
    let num_nodes = ts.num_nodes();
    let total_weight = weights.total();
    let breakpoints = ts.breakpoints();

    let mut state: Vec<Vec<f64>> = vec![vec![0.0; weights.k()]; num_nodes];
    for (i, &sample) in ts.samples().iter().enumerate() {
        state[sample.as_usize()] = weights.row(i).to_vec();
    }
    let mut parent = vec![NodeId::NULL; num_nodes];

    let mut per_tree_flat: Vec<Vec<f64>> = Vec::with_capacity(ts.num_trees());
    let mut diffs = ts.edge_diffs();
    while let Some(diff) = diffs.next() {
        for edge in &diff.edges_out {
            let child_state = state[edge.child.as_usize()].clone();
            for (s, c) in state[edge.parent.as_usize()].iter_mut().zip(&child_state) {
                *s -= c;
            }
            parent[edge.child.as_usize()] = NodeId::NULL;
        }
        for edge in &diff.edges_in {
            parent[edge.child.as_usize()] = edge.parent;
            let child_state = state[edge.child.as_usize()].clone();
            for (s, c) in state[edge.parent.as_usize()].iter_mut().zip(&child_state) {
                *s += c;
            }
        }

        let span = diff.interval.1 - diff.interval.0;
        let mut flat = vec![0.0; num_nodes * result_dim];
        for u in 0..num_nodes {
            let s = evaluate_summary(&state[u], &total_weight, polarised, f);
            for (slot, v) in flat[u * result_dim..(u + 1) * result_dim].iter_mut().zip(&s) {
                *slot = v * span;
            }
        }
        per_tree_flat.push(flat);
    }

    let flat_result = windowed_tree_stat(breakpoints, &per_tree_flat, windows, span_normalise);
    flat_result
        .into_iter()
        .map(|row| row.chunks(result_dim).map(|c| c.to_vec()).collect())
        .collect()
}
