use crate::model::{PropertyIndex, RelationKind};
use std::collections::{BTreeSet, HashMap};

/// Element id → ids of the property definitions related to it.
///
/// Built once per model. Targets are not filtered by type, so the index
/// covers property sets as well as quantity sets.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    entries: HashMap<u64, BTreeSet<u64>>,
}

impl ReverseIndex {
    #[must_use]
    pub fn get(&self, element_id: u64) -> Option<&BTreeSet<u64>> {
        self.entries.get(&element_id)
    }

    /// Number of indexed elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Indexes every defines-by-properties relation of a model.
pub fn build_index<P: PropertyIndex + ?Sized>(properties: &P) -> ReverseIndex {
    let mut entries: HashMap<u64, BTreeSet<u64>> = HashMap::new();
    let mut relations = 0usize;

    properties.for_each_relation(RelationKind::DefinesByProperties, &mut |rel| {
        relations += 1;
        for &element_id in rel.related_ids {
            entries.entry(element_id).or_default().insert(rel.relating_id);
        }
    });

    tracing::debug!(relations, elements = entries.len(), "Built reverse property index");

    ReverseIndex { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{other, quantity_set, relation};
    use crate::model::PropertyTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn indexes_all_relating_definitions() {
        let table: PropertyTable = [
            quantity_set(10, Some("Qto_A"), &[]),
            other(11, Some("Pset_WallCommon")),
            relation(20, 10, &[1, 2]),
            relation(21, 11, &[1]),
            relation(22, 10, &[2]),
        ]
        .into_iter()
        .collect();

        let index = build_index(&table);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(1).unwrap().iter().copied().collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(index.get(2).unwrap().iter().copied().collect::<Vec<_>>(), vec![10]);
        assert!(index.get(3).is_none());
    }

    #[test]
    fn empty_table_gives_empty_index() {
        assert!(build_index(&PropertyTable::new()).is_empty());
    }
}
