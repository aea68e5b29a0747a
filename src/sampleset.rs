//! Sample-set and index-tuple validation: spec.md §4.8, §7.

use std::collections::HashMap;

use crate::error::GeneralStatError;
use crate::ids::NodeId;
use crate::sequence::TreeSequence;

/// Validate a list of sample sets against spec.md §4.8/§7's
/// `InvalidSampleSet` rule (non-empty, sample ids only, no duplicates) and
/// translate each into indices into `ts.samples()`, suitable for
/// [`crate::weights::WeightMatrix::indicator`].
pub fn resolve_sample_sets(
    ts: &TreeSequence,
    sample_sets: &[Vec<NodeId>],
) -> Result<Vec<Vec<usize>>, GeneralStatError> {
    let sample_index: HashMap<NodeId, usize> = ts
        .samples()
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();

    sample_sets
        .iter()
        .map(|set| {
            if set.is_empty() {
                return Err(GeneralStatError::InvalidSampleSet {
                    reason: "sample set must not be empty".to_string(),
                });
            }
            let mut seen = std::collections::HashSet::with_capacity(set.len());
            let mut indices = Vec::with_capacity(set.len());
            for &node in set {
                if !seen.insert(node) {
                    return Err(GeneralStatError::InvalidSampleSet {
                        reason: format!("duplicate sample id {node}"),
                    });
                }
                let &idx = sample_index.get(&node).ok_or_else(|| {
                    GeneralStatError::InvalidSampleSet {
                        reason: format!("node {node} is not a sample"),
                    }
                })?;
                indices.push(idx);
            }
            Ok(indices)
        })
        .collect()
}

/// Validate a list of index tuples against spec.md §7's `InvalidIndexes`
/// rule: non-empty list, fixed arity, every entry in range.
pub fn validate_indexes(
    num_sample_sets: usize,
    arity: usize,
    indexes: &[Vec<usize>],
) -> Result<(), GeneralStatError> {
    if indexes.is_empty() {
        return Err(GeneralStatError::InvalidIndexes {
            reason: "index list must not be empty".to_string(),
        });
    }
    for tuple in indexes {
        if tuple.len() != arity {
            return Err(GeneralStatError::InvalidIndexes {
                reason: format!("expected tuples of arity {arity}, got {}", tuple.len()),
            });
        }
        for &i in tuple {
            if i >= num_sample_sets {
                return Err(GeneralStatError::InvalidIndexes {
                    reason: format!(
                        "index {i} out of range for {num_sample_sets} sample sets"
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{NodeFlags, TableCollection};

    fn ts_with_samples(n: usize) -> TreeSequence {
        let mut tables = TableCollection::new(1.0).unwrap();
        for _ in 0..n {
            tables.add_node(NodeFlags::new_sample(), 0.0);
        }
        tables.tree_sequence().unwrap()
    }

    #[test]
    fn rejects_empty_sample_set() {
        let ts = ts_with_samples(2);
        let err = resolve_sample_sets(&ts, &[vec![]]).unwrap_err();
        assert!(matches!(err, GeneralStatError::InvalidSampleSet { .. }));
    }

    #[test]
    fn rejects_duplicate_sample() {
        let ts = ts_with_samples(2);
        let err = resolve_sample_sets(&ts, &[vec![NodeId::from(0), NodeId::from(0)]]).unwrap_err();
        assert!(matches!(err, GeneralStatError::InvalidSampleSet { .. }));
    }

    #[test]
    fn rejects_non_sample_node() {
        let ts = ts_with_samples(2);
        let err = resolve_sample_sets(&ts, &[vec![NodeId::from(5)]]).unwrap_err();
        assert!(matches!(err, GeneralStatError::InvalidSampleSet { .. }));
    }

    #[test]
    fn validates_indexes_arity_and_range() {
        assert!(validate_indexes(3, 2, &[vec![0, 1]]).is_ok());
        assert!(validate_indexes(3, 2, &[vec![0, 1, 2]]).is_err());
        assert!(validate_indexes(3, 2, &[vec![0, 3]]).is_err());
        assert!(validate_indexes(3, 2, &[]).is_err());
    }
}
