//! Shared window-combination helper for the naive branch and node engines
//! (spec.md §4.9): given one value per tree, redistribute it over an
//! arbitrary window boundary array by the overlap between each tree's span
//! and each window.
//!
//! Mirrors the reference implementation's `windowed_tree_stat`, generalised
//! over the per-tree value's dimensionality so it can serve both the
//! branch engine (`M` per tree) and the node engine (`N * M` per tree,
//! flattened).

/// `per_tree[t]` is the (flattened) value accumulated for tree `t`
/// (already multiplied by the tree's span, matching the reference). Folds
/// these into `windows.len() - 1` output rows by the overlap between each
/// tree's interval and each window.
pub(crate) fn windowed_tree_stat(
    tree_breakpoints: &[f64],
    per_tree: &[Vec<f64>],
    windows: &[f64],
    span_normalise: bool,
) -> Vec<Vec<f64>> {
    let dim = per_tree.first().map_or(0, |v| v.len());
    let num_windows = windows.len() - 1;
    let mut result = vec![vec![0.0; dim]; num_windows];

    let mut tree_index = 0;
    for j in 0..num_windows {
        let w_left = windows[j];
        let w_right = windows[j + 1];
        loop {
            let t_left = tree_breakpoints[tree_index];
            let t_right = tree_breakpoints[tree_index + 1];
            let left = t_left.max(w_left);
            let right = t_right.min(w_right);
            let weight = ((right - left) / (t_right - t_left)).max(0.0);
            for (out, value) in result[j].iter_mut().zip(&per_tree[tree_index]) {
                *out += value * weight;
            }
            if t_right <= w_right {
                tree_index += 1;
                if t_right == w_right {
                    break;
                }
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
