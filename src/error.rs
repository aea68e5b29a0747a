//! Error types surfaced to callers.
//!
//! `GeneralStatError` covers exactly the error kinds named in spec.md §7;
//! `TskitError` additionally covers the in-memory table-construction errors
//! needed because this crate owns its own `TableCollection`, unlike the
//! spec's "external collaborator" file-backed tree-sequence layer.

use thiserror::Error;

/// Errors raised while building or validating a [`crate::TableCollection`]
/// or [`crate::TreeSequence`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TskitError {
    #[error("left must be < right (got left={left}, right={right})")]
    EdgeIntervalError { left: f64, right: f64 },
    #[error("edge right ({right}) exceeds sequence length ({sequence_length})")]
    EdgeExceedsSequenceLength { right: f64, sequence_length: f64 },
    #[error("sequence length must be > 0 (got {0})")]
    InvalidSequenceLength(f64),
    #[error("node id {0} is out of range")]
    NodeOutOfRange(i32),
    #[error("site id {0} is out of range")]
    SiteOutOfRange(i32),
    #[error("mutation id {0} is out of range")]
    MutationOutOfRange(i32),
    #[error("site positions must be strictly increasing (got {prev} then {next})")]
    SitesNotSorted { prev: f64, next: f64 },
    #[error("mutation parent must precede its child mutation at the same site")]
    MutationParentOrder,
    #[error("edges do not form a forest at every point of the sequence")]
    InconsistentTopology,
    #[error(transparent)]
    Stat(#[from] GeneralStatError),
}

/// Errors raised by [`crate::general_stat`] and the convenience statistics
/// built on top of it. Corresponds 1:1 to spec.md §7's error kinds; internal
/// arithmetic issues (zero denominators) are deliberately NOT represented
/// here; they surface as non-finite (`NaN`/`±inf`) values instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneralStatError {
    #[error("first dimension of W ({got}) must equal the sample count ({expected})")]
    InvalidWeights { got: usize, expected: usize },
    #[error("invalid sample set: {reason}")]
    InvalidSampleSet { reason: String },
    #[error("invalid index tuple: {reason}")]
    InvalidIndexes { reason: String },
    #[error("invalid windows: {reason}")]
    InvalidWindows { reason: String },
    #[error("invalid mode: {0:?}")]
    InvalidMode(String),
    #[error("feature not supported: {0}")]
    FeatureNotSupported(&'static str),
}
