//! The read-only tree-sequence view: spec.md §4.1's "Tree-sequence view"
//! component.
//!
//! A [`TreeSequence`] is produced once, from a [`TableCollection`], by
//! [`TableCollection::tree_sequence`] and is thereafter immutable. It owns
//! precomputed edge orderings (by left, by right) so that
//! [`TreeSequence::edge_diffs`] can walk the whole sequence in `O(E)`, per
//! spec.md §4.1.

use crate::error::TskitError;
use crate::ids::{EdgeId, NodeId, SiteId};
use crate::tables::{EdgeTableRow, MutationTableRow, NodeTableRow, SiteTableRow, TableCollection};

/// A read-only, validated, indexed tree sequence.
///
/// Construction is the only place invariants from spec.md §3 are checked:
/// sites sorted by strictly increasing position, mutation parents
/// preceding their children at a site, and edges forming a forest (no node
/// has two active parents at the same position).
#[derive(Debug)]
pub struct TreeSequence {
    tables: TableCollection,
    samples: Vec<NodeId>,
    /// Edge ids sorted by `left` ascending (ties broken by parent time
    /// ascending), used to find `edges_in` for each tree.
    insertion_order: Vec<EdgeId>,
    /// Edge ids sorted by `right` ascending (ties broken by parent time
    /// descending), used to find `edges_out` for each tree.
    removal_order: Vec<EdgeId>,
    /// Sorted, deduplicated breakpoints: `0`, `L`, and every distinct edge
    /// endpoint in between.
    breakpoints: Vec<f64>,
    /// `mutations_by_site[s]` holds the row indexes into `tables.mutations()`
    /// for site `s`, in table order (parent-before-child, per spec.md §3).
    mutations_by_site: Vec<Vec<usize>>,
}

impl TreeSequence {
    pub(crate) fn new(tables: TableCollection) -> Result<Self, TskitError> {
        validate_sites(tables.sites())?;
        let mutations_by_site = group_mutations_by_site(tables.sites(), tables.mutations())?;
        let samples: Vec<NodeId> = tables
            .nodes()
            .iter()
            .filter(|row| row.flags.is_sample())
            .map(|row| row.id)
            .collect();

        let mut insertion_order: Vec<EdgeId> = (0..tables.edges().len()).map(EdgeId::from).collect();
        let mut removal_order = insertion_order.clone();
        let time = |n: NodeId| tables.nodes()[n.as_usize()].time;
        insertion_order.sort_by(|&a, &b| {
            let ea = &tables.edges()[a.as_usize()];
            let eb = &tables.edges()[b.as_usize()];
            ea.left
                .partial_cmp(&eb.left)
                .unwrap()
                .then_with(|| time(ea.parent).partial_cmp(&time(eb.parent)).unwrap())
        });
        removal_order.sort_by(|&a, &b| {
            let ea = &tables.edges()[a.as_usize()];
            let eb = &tables.edges()[b.as_usize()];
            ea.right
                .partial_cmp(&eb.right)
                .unwrap()
                .then_with(|| time(eb.parent).partial_cmp(&time(ea.parent)).unwrap())
        });

        validate_forest(&tables)?;

        let mut breakpoints: Vec<f64> = Vec::with_capacity(tables.edges().len() * 2 + 2);
        breakpoints.push(0.0);
        breakpoints.push(tables.sequence_length());
        for edge in tables.edges() {
            breakpoints.push(edge.left);
            breakpoints.push(edge.right);
        }
        breakpoints.sort_by(|a, b| a.partial_cmp(b).unwrap());
        breakpoints.dedup_by(|a, b| a == b);

        Ok(Self {
            tables,
            samples,
            insertion_order,
            removal_order,
            breakpoints,
            mutations_by_site,
        })
    }

    pub fn sequence_length(&self) -> f64 {
        self.tables.sequence_length()
    }

    pub fn num_nodes(&self) -> usize {
        self.tables.nodes().len()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn num_sites(&self) -> usize {
        self.tables.sites().len()
    }

    pub fn num_edges(&self) -> usize {
        self.tables.edges().len()
    }

    /// The breakpoints delimiting the local trees: `num_trees() + 1` values
    /// from `0` to `sequence_length()`.
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn num_trees(&self) -> usize {
        self.breakpoints.len() - 1
    }

    pub fn samples(&self) -> &[NodeId] {
        &self.samples
    }

    pub fn nodes(&self) -> &[NodeTableRow] {
        self.tables.nodes()
    }

    pub fn edges(&self) -> &[EdgeTableRow] {
        self.tables.edges()
    }

    pub fn sites(&self) -> &[SiteTableRow] {
        self.tables.sites()
    }

    pub fn mutations(&self) -> &[MutationTableRow] {
        self.tables.mutations()
    }

    pub fn node_time(&self, node: NodeId) -> f64 {
        self.tables.nodes()[node.as_usize()].time
    }

    /// Mutations at the given site, in parent-before-child order.
    pub fn mutations_at_site(&self, site: SiteId) -> impl Iterator<Item = &MutationTableRow> {
        self.mutations_by_site[site.as_usize()]
            .iter()
            .map(move |&idx| &self.tables.mutations()[idx])
    }

    pub(crate) fn insertion_order(&self) -> &[EdgeId] {
        &self.insertion_order
    }

    pub(crate) fn removal_order(&self) -> &[EdgeId] {
        &self.removal_order
    }

    /// A lazy, non-restartable stream of edge-diffs across the whole
    /// sequence, per spec.md §4.1.
    pub fn edge_diffs(&self) -> crate::edge_diff::EdgeDiffIterator<'_> {
        crate::edge_diff::EdgeDiffIterator::new(self)
    }
}

fn validate_sites(sites: &[SiteTableRow]) -> Result<(), TskitError> {
    for pair in sites.windows(2) {
        if !(pair[0].position < pair[1].position) {
            return Err(TskitError::SitesNotSorted {
                prev: pair[0].position,
                next: pair[1].position,
            });
        }
    }
    Ok(())
}

fn group_mutations_by_site(
    sites: &[SiteTableRow],
    mutations: &[MutationTableRow],
) -> Result<Vec<Vec<usize>>, TskitError> {
    let mut by_site: Vec<Vec<usize>> = vec![Vec::new(); sites.len()];
    for (idx, mutation) in mutations.iter().enumerate() {
        if mutation.site.as_usize() >= sites.len() {
            return Err(TskitError::SiteOutOfRange(mutation.site.0));
        }
        by_site[mutation.site.as_usize()].push(idx);
    }
    for site_mutations in &by_site {
        for (pos, &idx) in site_mutations.iter().enumerate() {
            let mutation = &mutations[idx];
            if mutation.parent.is_null() {
                continue;
            }
            let parent_pos = site_mutations
                .iter()
                .position(|&i| i == mutation.parent.as_usize());
            match parent_pos {
                Some(parent_pos) if parent_pos < pos => {}
                _ => return Err(TskitError::MutationParentOrder),
            }
        }
    }
    Ok(by_site)
}

/// Cheap check that no node has two simultaneously-active parents: for each
/// child, its edges (sorted by left) must not overlap.
fn validate_forest(tables: &TableCollection) -> Result<(), TskitError> {
    let mut by_child: std::collections::HashMap<i32, Vec<(f64, f64)>> =
        std::collections::HashMap::new();
    for edge in tables.edges() {
        by_child
            .entry(edge.child.0)
            .or_default()
            .push((edge.left, edge.right));
    }
    for intervals in by_child.values_mut() {
        intervals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        for pair in intervals.windows(2) {
            if pair[0].1 > pair[1].0 {
                return Err(TskitError::InconsistentTopology);
            }
        }
    }
    Ok(())
}
