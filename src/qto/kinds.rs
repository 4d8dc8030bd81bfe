use crate::model::{EntityKind, PropertyIndex, PropertyTable, QuantityKind};
use std::collections::HashMap;

/// Physical kind of each (quantity-set name, quantity name) pair seen in the
/// loaded models. Used only to annotate output with units.
#[derive(Debug, Clone, Default)]
pub struct QuantityKinds {
    kinds: HashMap<(String, String), QuantityKind>,
}

impl QuantityKinds {
    #[must_use]
    pub fn from_table(table: &PropertyTable) -> Self {
        let mut kinds = HashMap::new();

        for record in table.records() {
            let (EntityKind::QuantitySet { member_ids }, Some(set_name)) =
                (&record.kind, record.label())
            else {
                continue;
            };
            for &id in member_ids {
                if let (Some(name), Some(kind)) = (table.entity_name(id), table.quantity_kind(id)) {
                    kinds
                        .entry((set_name.to_string(), name.to_string()))
                        .or_insert(kind);
                }
            }
        }

        Self { kinds }
    }

    /// Adds entries from `other`; existing entries win.
    pub fn merge(&mut self, other: Self) {
        for (key, kind) in other.kinds {
            self.kinds.entry(key).or_insert(kind);
        }
    }

    #[must_use]
    pub fn get(&self, set_name: &str, quantity_name: &str) -> Option<QuantityKind> {
        self.kinds
            .get(&(set_name.to_string(), quantity_name.to_string()))
            .copied()
    }
}
