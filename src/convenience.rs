//! Convenience statistics: spec.md §6. Each function validates its sample
//! sets/indexes, builds the indicator weight matrix and summary function the
//! formula calls for, and delegates to [`crate::general_stat`].

use crate::error::GeneralStatError;
use crate::ids::NodeId;
use crate::mode::Mode;
use crate::sampleset::{resolve_sample_sets, validate_indexes};
use crate::stat::{general_stat, StatResult};
use crate::weights::WeightMatrix;
use crate::windows::Windows;

fn set_sizes(sample_sets: &[Vec<NodeId>]) -> Vec<f64> {
    sample_sets.iter().map(|s| s.len() as f64).collect()
}

/// Average pairwise diversity within each sample set, per spec.md §6.
pub fn diversity(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        x.iter()
            .zip(&n)
            .map(|(&xi, &ni)| xi * (ni - xi) / (ni * (ni - 1.0)))
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Average pairwise divergence between each pair of sample sets named by
/// `indexes`, per spec.md §6.
pub fn divergence(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    indexes: &[Vec<usize>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    validate_indexes(sample_sets.len(), 2, indexes)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        indexes
            .iter()
            .map(|idx| {
                let (i, j) = (idx[0], idx[1]);
                let denom = n[i] * (n[j] - if i == j { 1.0 } else { 0.0 });
                x[i] * (n[j] - x[j]) / denom
            })
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Y1: spec.md §6. One sample set per evaluation.
pub fn y1(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        x.iter()
            .zip(&n)
            .map(|(&xi, &ni)| xi * (ni - xi) * (ni - xi - 1.0) / (ni * (ni - 1.0) * (ni - 2.0)))
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Y2: spec.md §6, indexed pairs `(i, j)`.
pub fn y2(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    indexes: &[Vec<usize>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    validate_indexes(sample_sets.len(), 2, indexes)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        indexes
            .iter()
            .map(|idx| {
                let (i, j) = (idx[0], idx[1]);
                let denom = n[i] * n[j] * (n[j] - 1.0);
                let numer = x[i] * (n[j] - x[j]) * (n[j] - x[j] - 1.0);
                numer / denom
            })
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Y3: spec.md §6, indexed triples `(i, j, k)`.
pub fn y3(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    indexes: &[Vec<usize>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    validate_indexes(sample_sets.len(), 3, indexes)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        indexes
            .iter()
            .map(|idx| {
                let (i, j, k) = (idx[0], idx[1], idx[2]);
                let denom = n[i] * n[j] * n[k];
                let numer = x[i] * (n[j] - x[j]) * (n[k] - x[k]);
                numer / denom
            })
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Patterson's f2: spec.md §6, indexed pairs `(i, j)`.
pub fn f2(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    indexes: &[Vec<usize>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    validate_indexes(sample_sets.len(), 2, indexes)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        indexes
            .iter()
            .map(|idx| {
                let (i, j) = (idx[0], idx[1]);
                let denom = n[i] * (n[i] - 1.0) * n[j] * (n[j] - 1.0);
                let numer = x[i] * (x[i] - 1.0) * (n[j] - x[j]) * (n[j] - x[j] - 1.0)
                    - x[i] * (n[i] - x[i]) * (n[j] - x[j]) * x[j];
                numer / denom
            })
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Patterson's f3: spec.md §6, indexed triples `(i, j, k)`.
pub fn f3(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    indexes: &[Vec<usize>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    validate_indexes(sample_sets.len(), 3, indexes)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        indexes
            .iter()
            .map(|idx| {
                let (i, j, k) = (idx[0], idx[1], idx[2]);
                let denom = n[i] * (n[i] - 1.0) * n[j] * n[k];
                let numer = x[i] * (x[i] - 1.0) * (n[j] - x[j]) * (n[k] - x[k])
                    - x[i] * (n[i] - x[i]) * (n[j] - x[j]) * x[k];
                numer / denom
            })
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Patterson's f4: spec.md §6, indexed quadruples `(i, j, k, l)`.
pub fn f4(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    indexes: &[Vec<usize>],
    windows: &Windows,
    mode: Mode,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    validate_indexes(sample_sets.len(), 4, indexes)?;
    let n = set_sizes(sample_sets);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        indexes
            .iter()
            .map(|idx| {
                let (i, j, k, l) = (idx[0], idx[1], idx[2], idx[3]);
                let denom = n[i] * n[j] * n[k] * n[l];
                let numer = x[i] * x[k] * (n[j] - x[j]) * (n[l] - x[l])
                    - x[i] * x[l] * (n[j] - x[j]) * (n[k] - x[k]);
                numer / denom
            })
            .collect()
    };
    general_stat(ts, &weights, &f, windows, mode, false, span_normalise)
}

/// Per-site Fst, spec.md §6: `1 - 2(dX + dY) / (dX + dY + 2 dXY)`, built from
/// per-site diversity and divergence with `windows = "sites"` and
/// `span_normalise = false`. Dividing by zero (a monomorphic or absent site)
/// yields `NaN` the way IEEE 754 division does, matching the reference's
/// `nan`-on-invariant-site behaviour without special-casing it.
pub fn fst(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    indexes: &[Vec<usize>],
) -> Result<Vec<Vec<f64>>, GeneralStatError> {
    validate_indexes(sample_sets.len(), 2, indexes)?;
    let windows = Windows::Sites;
    let d = diversity(ts, sample_sets, &windows, Mode::Site, false)?
        .per_window()
        .unwrap()
        .to_vec();
    let div = divergence(ts, sample_sets, indexes, &windows, Mode::Site, false)?
        .per_window()
        .unwrap()
        .to_vec();

    Ok(d.iter()
        .zip(&div)
        .map(|(d_row, dxy_row)| {
            indexes
                .iter()
                .enumerate()
                .map(|(k, idx)| {
                    let (i, j) = (idx[0], idx[1]);
                    let dx = d_row[i];
                    let dy = d_row[j];
                    let dxy = dxy_row[k];
                    1.0 - 2.0 * (dx + dy) / (dx + dy + 2.0 * dxy)
                })
                .collect()
        })
        .collect())
}

/// Branch/node-mode generalised sample frequency spectrum, spec.md §6, §9
/// open question 9(b): site mode is intentionally left unimplemented. Each
/// output bucket `n_out = 1 + max(|sample_sets|)` counts, per sample set,
/// how much of the sequence has exactly that many descendant samples from
/// the set below a node (branch mode) or at a node (node mode).
pub fn sample_frequency_spectrum(
    ts: &crate::sequence::TreeSequence,
    sample_sets: &[Vec<NodeId>],
    windows: &Windows,
    mode: Mode,
) -> Result<StatResult, GeneralStatError> {
    if matches!(mode, Mode::Site) {
        return Err(GeneralStatError::FeatureNotSupported(
            "site-mode sample_frequency_spectrum is not implemented",
        ));
    }
    let resolved_sets = resolve_sample_sets(ts, sample_sets)?;
    let num_sample_sets = sample_sets.len();
    let n_out = 1 + sample_sets.iter().map(|s| s.len()).max().unwrap_or(0);
    let weights = WeightMatrix::indicator(ts.num_samples(), &resolved_sets);
    let f = move |x: &[f64]| {
        let mut out = vec![0.0; n_out * num_sample_sets];
        for (j, &xj) in x.iter().enumerate() {
            let bucket = xj.round() as usize;
            if bucket < n_out {
                out[bucket * num_sample_sets + j] = 1.0;
            }
        }
        out
    };
    general_stat(ts, &weights, &f, windows, mode, true, false)
}
