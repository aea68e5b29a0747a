//! Owned table storage and the [`TableCollection`] builder.
//!
//! This plays the same role as the teacher's `TableCollection` +
//! `*Table`/`Owned*Table` types, but stores rows directly in `Vec`s instead
//! of delegating to an FFI-owned C table: there is no metadata, population,
//! migration, or individual table, since spec.md §3's data model has no use
//! for them.

use crate::error::TskitError;
use crate::ids::{EdgeId, MutationId, NodeId, SiteId};

bitflags::bitflags! {
    /// Flags on a node row. Only the sample flag is meaningful to this crate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u32 {
        const IS_SAMPLE = 1 << 0;
    }
}

impl NodeFlags {
    /// Convenience constructor mirroring the teacher's `NodeFlags::new_sample`.
    pub fn new_sample() -> Self {
        Self::IS_SAMPLE
    }

    pub fn is_sample(&self) -> bool {
        self.contains(Self::IS_SAMPLE)
    }
}

/// A row of the node table.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTableRow {
    pub id: NodeId,
    pub flags: NodeFlags,
    pub time: f64,
}

/// A row of the edge table.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeTableRow {
    pub id: EdgeId,
    pub left: f64,
    pub right: f64,
    pub parent: NodeId,
    pub child: NodeId,
}

/// A row of the site table. `ancestral_state` is an arbitrary byte string,
/// not necessarily UTF-8 or single-character (spec.md §4.5 edge cases).
#[derive(Debug, Clone, PartialEq)]
pub struct SiteTableRow {
    pub id: SiteId,
    pub position: f64,
    pub ancestral_state: Vec<u8>,
}

/// A row of the mutation table. `parent` is `MutationId::NULL` for a
/// mutation with no parent mutation at its site.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationTableRow {
    pub id: MutationId,
    pub site: SiteId,
    pub node: NodeId,
    pub derived_state: Vec<u8>,
    pub parent: MutationId,
}

/// Owned, append-only storage for nodes, edges, sites and mutations, plus
/// the fixed sequence length. Build one up with `add_node`/`add_edge`/
/// `add_site`/`add_mutation`, then call [`TableCollection::tree_sequence`]
/// to obtain a validated, queryable [`crate::TreeSequence`].
#[derive(Debug, Clone)]
pub struct TableCollection {
    sequence_length: f64,
    nodes: Vec<NodeTableRow>,
    edges: Vec<EdgeTableRow>,
    sites: Vec<SiteTableRow>,
    mutations: Vec<MutationTableRow>,
}

impl TableCollection {
    /// Create an empty table collection for a sequence of the given length.
    pub fn new(sequence_length: f64) -> Result<Self, TskitError> {
        if !(sequence_length > 0.0) {
            return Err(TskitError::InvalidSequenceLength(sequence_length));
        }
        Ok(Self {
            sequence_length,
            nodes: Vec::new(),
            edges: Vec::new(),
            sites: Vec::new(),
            mutations: Vec::new(),
        })
    }

    pub fn sequence_length(&self) -> f64 {
        self.sequence_length
    }

    pub fn nodes(&self) -> &[NodeTableRow] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeTableRow] {
        &self.edges
    }

    pub fn sites(&self) -> &[SiteTableRow] {
        &self.sites
    }

    pub fn mutations(&self) -> &[MutationTableRow] {
        &self.mutations
    }

    /// Add a node row, returning its id.
    pub fn add_node(&mut self, flags: NodeFlags, time: f64) -> NodeId {
        let id = NodeId::from(self.nodes.len());
        self.nodes.push(NodeTableRow { id, flags, time });
        id
    }

    /// Add an edge row over the half-open interval `[left, right)`.
    pub fn add_edge(
        &mut self,
        left: f64,
        right: f64,
        parent: NodeId,
        child: NodeId,
    ) -> Result<EdgeId, TskitError> {
        if !(left < right) {
            return Err(TskitError::EdgeIntervalError { left, right });
        }
        if right > self.sequence_length {
            return Err(TskitError::EdgeExceedsSequenceLength {
                right,
                sequence_length: self.sequence_length,
            });
        }
        self.check_node(parent)?;
        self.check_node(child)?;
        let id = EdgeId::from(self.edges.len());
        self.edges.push(EdgeTableRow {
            id,
            left,
            right,
            parent,
            child,
        });
        Ok(id)
    }

    /// Add a site row. Sites need not be added in position order; order is
    /// validated at [`TableCollection::tree_sequence`] time.
    pub fn add_site(
        &mut self,
        position: f64,
        ancestral_state: impl Into<Vec<u8>>,
    ) -> Result<SiteId, TskitError> {
        let id = SiteId::from(self.sites.len());
        self.sites.push(SiteTableRow {
            id,
            position,
            ancestral_state: ancestral_state.into(),
        });
        Ok(id)
    }

    /// Add a mutation row. `parent` should be `MutationId::NULL` if this
    /// mutation has no parent mutation at its site.
    pub fn add_mutation(
        &mut self,
        site: SiteId,
        node: NodeId,
        parent: MutationId,
        derived_state: impl Into<Vec<u8>>,
    ) -> Result<MutationId, TskitError> {
        self.check_site(site)?;
        self.check_node(node)?;
        let id = MutationId::from(self.mutations.len());
        self.mutations.push(MutationTableRow {
            id,
            site,
            node,
            derived_state: derived_state.into(),
            parent,
        });
        Ok(id)
    }

    fn check_node(&self, node: NodeId) -> Result<(), TskitError> {
        if node.0 < 0 || node.as_usize() >= self.nodes.len() {
            return Err(TskitError::NodeOutOfRange(node.0));
        }
        Ok(())
    }

    fn check_site(&self, site: SiteId) -> Result<(), TskitError> {
        if site.0 < 0 || site.as_usize() >= self.sites.len() {
            return Err(TskitError::SiteOutOfRange(site.0));
        }
        Ok(())
    }

    /// Consume the table collection, validating and indexing it into a
    /// [`crate::TreeSequence`].
    pub fn tree_sequence(self) -> Result<crate::sequence::TreeSequence, TskitError> {
        crate::sequence::TreeSequence::new(self)
    }
}
