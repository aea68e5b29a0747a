//! The edge-diff stream: spec.md §4.1.
//!
//! Produces, in strictly increasing position order, one record per local
//! tree: the edges that just left the tree and the edges that just entered
//! it. Total work across the whole sequence is `O(E)` given the
//! precomputed `insertion_order`/`removal_order` built once by
//! [`crate::TreeSequence::new`].

use crate::ids::EdgeId;
use crate::tables::EdgeTableRow;
use crate::sequence::TreeSequence;
use streaming_iterator::StreamingIterator;

/// One record of the edge-diff stream: the interval of the next tree, the
/// edges that ceased at its left endpoint, and the edges that begin there.
pub struct EdgeDiff<'a> {
    pub interval: (f64, f64),
    pub edges_out: Vec<&'a EdgeTableRow>,
    pub edges_in: Vec<&'a EdgeTableRow>,
}

/// A non-restartable, pull-based stream over [`EdgeDiff`] records.
///
/// Implements [`StreamingIterator`] (per spec.md §9's "lazy sequences"
/// design note) rather than the standard `Iterator`, since each `EdgeDiff`
/// borrows from the tree sequence and is only valid until the next
/// `advance`.
pub struct EdgeDiffIterator<'a> {
    ts: &'a TreeSequence,
    breakpoint_index: usize,
    insertion_cursor: usize,
    removal_cursor: usize,
    current: Option<EdgeDiff<'a>>,
}

impl<'a> EdgeDiffIterator<'a> {
    pub(crate) fn new(ts: &'a TreeSequence) -> Self {
        Self {
            ts,
            breakpoint_index: 0,
            insertion_cursor: 0,
            removal_cursor: 0,
            current: None,
        }
    }

    fn edge(&self, id: EdgeId) -> &'a EdgeTableRow {
        &self.ts.edges()[id.as_usize()]
    }
}

impl<'a> StreamingIterator for EdgeDiffIterator<'a> {
    type Item = EdgeDiff<'a>;

    fn advance(&mut self) {
        let breakpoints = self.ts.breakpoints();
        if self.breakpoint_index + 1 >= breakpoints.len() {
            self.current = None;
            return;
        }
        let t_left = breakpoints[self.breakpoint_index];
        let t_right = breakpoints[self.breakpoint_index + 1];

        let removal_order = self.ts.removal_order();
        let mut edges_out = Vec::new();
        while self.removal_cursor < removal_order.len() {
            let edge = self.edge(removal_order[self.removal_cursor]);
            if edge.right != t_left {
                break;
            }
            edges_out.push(edge);
            self.removal_cursor += 1;
        }

        let insertion_order = self.ts.insertion_order();
        let mut edges_in = Vec::new();
        while self.insertion_cursor < insertion_order.len() {
            let edge = self.edge(insertion_order[self.insertion_cursor]);
            if edge.left != t_left {
                break;
            }
            edges_in.push(edge);
            self.insertion_cursor += 1;
        }

        self.breakpoint_index += 1;
        self.current = Some(EdgeDiff {
            interval: (t_left, t_right),
            edges_out,
            edges_in,
        });
    }

    fn get(&self) -> Option<&Self::Item> {
        self.current.as_ref()
    }
}
