//! The site engine: spec.md §4.5.

use std::collections::HashMap;

use streaming_iterator::StreamingIterator;

use crate::ids::NodeId;
use crate::sequence::TreeSequence;
use crate::weights::{SummaryFn, WeightMatrix};

/// Accumulates the per-site allele-weight map and folds it into `result`,
/// shared by both the incremental and naive implementations below.
fn accumulate_sites(
    ts: &TreeSequence,
    state: &[Vec<f64>],
    total_weight: &[f64],
    f: &SummaryFn,
    windows: &[f64],
    polarised: bool,
    t_right: f64,
    site_index: &mut usize,
    window_index: &mut usize,
    result: &mut [Vec<f64>],
) {
    let sites = ts.sites();
    while *site_index < sites.len() && sites[*site_index].position < t_right {
        let site = &sites[*site_index];
        let k = total_weight.len();

        let mut allele_state: HashMap<Vec<u8>, Vec<f64>> = HashMap::new();
        allele_state.insert(site.ancestral_state.clone(), total_weight.to_vec());

        for mutation in ts.mutations_at_site(site.id) {
            let node_state = &state[mutation.node.as_usize()];

            let derived = allele_state
                .entry(mutation.derived_state.clone())
                .or_insert_with(|| vec![0.0; k]);
            for (a, b) in derived.iter_mut().zip(node_state) {
                *a += b;
            }

            if mutation.parent.is_null() {
                let ancestral = allele_state.get_mut(&site.ancestral_state).unwrap();
                for (a, b) in ancestral.iter_mut().zip(node_state) {
                    *a -= b;
                }
            } else {
                let parent_allele = ts.mutations()[mutation.parent.as_usize()]
                    .derived_state
                    .clone();
                let parent_entry = allele_state
                    .entry(parent_allele)
                    .or_insert_with(|| vec![0.0; k]);
                for (a, b) in parent_entry.iter_mut().zip(node_state) {
                    *a -= b;
                }
            }
        }

        if polarised {
            allele_state.remove(&site.ancestral_state);
        }

        let result_dim = result[0].len();
        let mut site_result = vec![0.0; result_dim];
        for value in allele_state.values() {
            for (a, b) in site_result.iter_mut().zip(f(value)) {
                *a += b;
            }
        }

        while *window_index + 1 < windows.len() && windows[*window_index + 1] <= site.position {
            *window_index += 1;
        }
        for (a, b) in result[*window_index].iter_mut().zip(&site_result) {
            *a += b;
        }
        *site_index += 1;
    }
}

fn span_normalise_rows(result: &mut [Vec<f64>], windows: &[f64]) {
    for (j, row) in result.iter_mut().enumerate() {
        let length = windows[j + 1] - windows[j];
        for v in row.iter_mut() {
            *v /= length;
        }
    }
}

/// Efficient implementation: maintains the subtree-sum state incrementally
/// across edge-diffs, and evaluates the allele-weight map once per site as
/// its tree becomes current, per spec.md §4.5.
pub fn general_site_stat(
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
    let mut parent = vec![NodeId::NULL; num_nodes];

    let mut site_index = 0usize;
    let mut window_index = 0usize;

    let mut diffs = ts.edge_diffs();
    while let Some(diff) = diffs.next() {
        let (_, t_right) = diff.interval;

        for edge in &diff.edges_out {
            let mut u = edge.parent;
            while !u.is_null() {
                let child_state = state[edge.child.as_usize()].clone();
                for (s, c) in state[u.as_usize()].iter_mut().zip(&child_state) {
                    *s -= c;
                }
                u = parent[u.as_usize()];
            }
            parent[edge.child.as_usize()] = NodeId::NULL;
        }

        for edge in &diff.edges_in {
            parent[edge.child.as_usize()] = edge.parent;
            let mut u = edge.parent;
            while !u.is_null() {
                let child_state = state[edge.child.as_usize()].clone();
                for (s, c) in state[u.as_usize()].iter_mut().zip(&child_state) {
                    *s += c;
                }
                u = parent[u.as_usize()];
            }
        }

        accumulate_sites(
            ts,
            &state,
            &total_weight,
            f,
            windows,
            polarised,
            t_right,
            &mut site_index,
            &mut window_index,
            &mut result,
        );
    }

    if span_normalise {
        span_normalise_rows(&mut result, windows);
    }
    result
}

/// Per-tree-from-scratch reference, used only for cross-checking: rebuilds
/// the subtree-sum state for each tree from its active edge set rather than
/// maintaining it incrementally, per spec.md §4.9.
pub fn naive_site_stat(
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
    let total_weight = weights.total();
    let breakpoints = ts.breakpoints();

    let mut site_index = 0usize;
    let mut window_index = 0usize;

    for t in 0..ts.num_trees() {
        let t_left = breakpoints[t];
        let t_right = breakpoints[t + 1];

        let mut local_edges: Vec<_> = ts
            .edges()
            .iter()
            .filter(|e| e.left <= t_left && e.right >= t_right)
            .collect();
        local_edges.sort_by(|a, b| {
            ts.node_time(a.child)
                .partial_cmp(&ts.node_time(b.child))
                .unwrap()
        });

        let mut state: Vec<Vec<f64>> = vec![vec![0.0; weights.k()]; ts.num_nodes()];
        for (i, &sample) in ts.samples().iter().enumerate() {
            state[sample.as_usize()] = weights.row(i).to_vec();
        }
        for edge in &local_edges {
            let child_state = state[edge.child.as_usize()].clone();
            for (s, c) in state[edge.parent.as_usize()].iter_mut().zip(&child_state) {
                *s += c;
            }
        }

        accumulate_sites(
            ts,
            &state,
            &total_weight,
            f,
            windows,
            polarised,
            t_right,
            &mut site_index,
            &mut window_index,
            &mut result,
        );
    }

    if span_normalise {
        span_normalise_rows(&mut result, windows);
    }
    result
}
