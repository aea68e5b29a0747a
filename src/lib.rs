//! A generalised statistics engine over succinct tree sequences.
//!
//! This crate implements the incremental traversal engine that maintains,
//! as local trees change along a genome, per-node subtree sums of sample
//! weights and per-window contributions to an output statistic, for three
//! modes (`branch`, `site`, `node`). The published population-genetic
//! statistics (diversity, divergence, Y1/Y2/Y3, f2/f3/f4, per-site Fst, the
//! sample frequency spectrum) are all expressed as calls into this engine
//! with a particular weight matrix and summary function; see
//! [`convenience`].
//!
//! ```
//! use tree_stats::{NodeFlags, TableCollection};
//!
//! let mut tables = TableCollection::new(1.0).unwrap();
//! let s0 = tables.add_node(NodeFlags::new_sample(), 0.0);
//! let s1 = tables.add_node(NodeFlags::new_sample(), 0.0);
//! let root = tables.add_node(NodeFlags::default(), 1.0);
//! tables.add_edge(0.0, 1.0, root, s0).unwrap();
//! tables.add_edge(0.0, 1.0, root, s1).unwrap();
//! let ts = tables.tree_sequence().unwrap();
//! assert_eq!(ts.num_samples(), 2);
//! ```

pub mod convenience;
pub mod edge_diff;
pub mod engine;
pub mod error;
pub mod ids;
pub mod mode;
pub(crate) mod naive_windowing;
pub mod sampleset;
pub mod sequence;
pub mod stat;
pub mod tables;
pub mod weights;
pub mod windows;

pub use edge_diff::{EdgeDiff, EdgeDiffIterator};
pub use error::{GeneralStatError, TskitError};
pub use ids::{EdgeId, MutationId, NodeId, TSK_NULL};
pub use mode::Mode;
pub use sampleset::{resolve_sample_sets, validate_indexes};
pub use sequence::TreeSequence;
pub use stat::{general_stat, naive_general_stat, StatResult};
pub use tables::{
    EdgeTableRow, MutationTableRow, NodeFlags, NodeTableRow, SiteTableRow, TableCollection,
};
pub use weights::{probe_output_dim, SummaryFn, WeightMatrix};
pub use windows::Windows;

pub use convenience::{
    diversity, divergence, f2, f3, f4, fst, sample_frequency_spectrum, y1, y2, y3,
};
