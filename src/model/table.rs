use super::record::{EntityKind, PropertyRecord, QuantityKind, RelationKind};
use std::collections::BTreeMap;

/// A relation record as handed to [`PropertyIndex::for_each_relation`].
#[derive(Debug, Clone, Copy)]
pub struct RelationRef<'a> {
    pub relation_id: u64,
    pub relating_id: u64,
    pub related_ids: &'a [u64],
}

/// Read contract over one model's property table.
///
/// Missing ids are never an error: every lookup returns `None` instead.
pub trait PropertyIndex {
    fn record(&self, id: u64) -> Option<&PropertyRecord>;

    /// Visits every relation of `kind` in table order. Relations without a
    /// relating entity are not visited.
    fn for_each_relation(&self, kind: RelationKind, visit: &mut dyn FnMut(RelationRef<'_>));

    /// Human-readable name of any entity; empty names count as absent.
    fn entity_name(&self, id: u64) -> Option<&str> {
        self.record(id).and_then(PropertyRecord::label)
    }

    /// Finite value of a quantity-value entity.
    fn quantity_value(&self, id: u64) -> Option<f64> {
        self.record(id).and_then(PropertyRecord::quantity_value)
    }

    fn quantity_kind(&self, id: u64) -> Option<QuantityKind> {
        self.record(id).and_then(PropertyRecord::quantity_kind)
    }

    /// Visits the member quantities of a quantity-set in `member_ids` order.
    /// Does nothing for ids that are not quantity-sets.
    fn for_each_quantity_of_set(&self, set_id: u64, visit: &mut dyn FnMut(u64)) {
        if let Some(PropertyRecord {
            kind: EntityKind::QuantitySet { member_ids },
            ..
        }) = self.record(set_id)
        {
            for &id in member_ids {
                visit(id);
            }
        }
    }
}

/// In-memory property table, ordered by entity id.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    records: BTreeMap<u64, PropertyRecord>,
}

impl PropertyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any previous record with the same id.
    pub fn insert(&mut self, record: PropertyRecord) {
        self.records.insert(record.id, record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &PropertyRecord> {
        self.records.values()
    }
}

impl FromIterator<PropertyRecord> for PropertyTable {
    fn from_iter<I: IntoIterator<Item = PropertyRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

impl PropertyIndex for PropertyTable {
    fn record(&self, id: u64) -> Option<&PropertyRecord> {
        self.records.get(&id)
    }

    fn for_each_relation(&self, kind: RelationKind, visit: &mut dyn FnMut(RelationRef<'_>)) {
        for record in self.records.values() {
            if let EntityKind::Relation {
                kind: record_kind,
                relating_id: Some(relating_id),
                related_ids,
            } = &record.kind
            {
                if *record_kind == kind {
                    visit(RelationRef {
                        relation_id: record.id,
                        relating_id: *relating_id,
                        related_ids,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{other, quantity, quantity_set, relation};
    use pretty_assertions::assert_eq;

    fn table() -> PropertyTable {
        [
            quantity(10, "area", QuantityKind::Area, Some(20.0)),
            quantity(11, "volume", QuantityKind::Volume, Some(f64::NAN)),
            quantity_set(20, Some("Qto_WallBaseQuantities"), &[10, 11, 99]),
            relation(30, 20, &[1, 2]),
            relation(31, 40, &[3]),
            other(40, Some("")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn missing_ids_resolve_to_none() {
        let table = table();
        assert!(table.record(999).is_none());
        assert_eq!(table.entity_name(999), None);
        assert_eq!(table.quantity_value(999), None);
    }

    #[test]
    fn names_and_values() {
        let table = table();
        assert_eq!(table.entity_name(20), Some("Qto_WallBaseQuantities"));
        assert_eq!(table.entity_name(40), None);
        assert_eq!(table.quantity_value(10), Some(20.0));
        assert_eq!(table.quantity_value(11), None);
        assert_eq!(table.quantity_value(20), None);
        assert_eq!(table.quantity_kind(10), Some(QuantityKind::Area));
    }

    #[test]
    fn relations_visit_in_table_order() {
        let table = table();
        let mut seen = Vec::new();
        table.for_each_relation(RelationKind::DefinesByProperties, &mut |rel| {
            seen.push((rel.relation_id, rel.relating_id, rel.related_ids.to_vec()));
        });
        assert_eq!(seen, vec![(30, 20, vec![1, 2]), (31, 40, vec![3])]);

        let mut none = 0;
        table.for_each_relation(RelationKind::ContainedInSpatialStructure, &mut |_| none += 1);
        assert_eq!(none, 0);
    }

    #[test]
    fn set_members_in_order() {
        let table = table();
        let mut members = Vec::new();
        table.for_each_quantity_of_set(20, &mut |id| members.push(id));
        assert_eq!(members, vec![10, 11, 99]);

        members.clear();
        table.for_each_quantity_of_set(10, &mut |id| members.push(id));
        assert!(members.is_empty());
    }
}
