//! The `general_stat` dispatcher: spec.md §6.

use crate::engine::{branch, node, site};
use crate::error::GeneralStatError;
use crate::mode::Mode;
use crate::sequence::TreeSequence;
use crate::weights::{SummaryFn, WeightMatrix};
use crate::windows::Windows;

/// The result of [`general_stat`]: `[W][M]` for branch/site mode, `[W][N][M]`
/// for node mode, per spec.md §6.
#[derive(Debug, Clone)]
pub enum StatResult {
    PerWindow(Vec<Vec<f64>>),
    PerWindowPerNode(Vec<Vec<Vec<f64>>>),
}

impl StatResult {
    pub fn per_window(&self) -> Option<&[Vec<f64>]> {
        match self {
            StatResult::PerWindow(v) => Some(v),
            StatResult::PerWindowPerNode(_) => None,
        }
    }

    pub fn per_window_per_node(&self) -> Option<&[Vec<Vec<f64>>]> {
        match self {
            StatResult::PerWindowPerNode(v) => Some(v),
            StatResult::PerWindow(_) => None,
        }
    }
}

/// The single general-purpose statistics entry point of spec.md §6:
/// validates its inputs up front so that a rejected call never produces a
/// partial result (spec.md §7), resolves the window specification, and
/// dispatches to the named engine.
pub fn general_stat(
    ts: &TreeSequence,
    weights: &WeightMatrix,
    f: &SummaryFn,
    windows: &Windows,
    mode: Mode,
    polarised: bool,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    weights.validate(ts.num_samples())?;
    let resolved = windows.resolve(ts)?;
    // "sites" windows are never span-normalised, even if the caller asked:
    // each row already represents a single site, not a genomic interval.
    let effective_span_normalise = span_normalise && !windows.is_sites();

    match mode {
        Mode::Branch => Ok(StatResult::PerWindow(branch::general_branch_stat(
            ts,
            weights,
            f,
            &resolved,
            polarised,
            effective_span_normalise,
        ))),
        Mode::Site => Ok(StatResult::PerWindow(site::general_site_stat(
            ts,
            weights,
            f,
            &resolved,
            polarised,
            effective_span_normalise,
        ))),
        Mode::Node => Ok(StatResult::PerWindowPerNode(node::general_node_stat(
            ts,
            weights,
            f,
            &resolved,
            polarised,
            effective_span_normalise,
        ))),
    }
}

/// The naive, per-tree-from-scratch counterpart of [`general_stat`], used
/// only for cross-checking in tests (spec.md §4.9).
pub fn naive_general_stat(
    ts: &TreeSequence,
    weights: &WeightMatrix,
    f: &SummaryFn,
    windows: &Windows,
    mode: Mode,
    polarised: bool,
    span_normalise: bool,
) -> Result<StatResult, GeneralStatError> {
    weights.validate(ts.num_samples())?;
    let resolved = windows.resolve(ts)?;
    let effective_span_normalise = span_normalise && !windows.is_sites();

    match mode {
        Mode::Branch => Ok(StatResult::PerWindow(branch::naive_branch_stat(
            ts,
            weights,
            f,
            &resolved,
            polarised,
            effective_span_normalise,
        ))),
        Mode::Site => Ok(StatResult::PerWindow(site::naive_site_stat(
            ts,
            weights,
            f,
            &resolved,
            polarised,
            effective_span_normalise,
        ))),
        Mode::Node => Ok(StatResult::PerWindowPerNode(node::naive_node_stat(
            ts,
            weights,
            f,
            &resolved,
            polarised,
            effective_span_normalise,
        ))),
    }
}
