use crate::model::PropertyIndex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Relative tolerance used when comparing results of the two strategies.
pub const EPSILON: f64 = 1e-9;

/// Summed quantities, keyed by quantity-set name then quantity name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregationResult {
    sets: BTreeMap<String, BTreeMap<String, f64>>,
}

impl AggregationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` into `set → quantity`, starting from zero.
    pub fn add(&mut self, set_name: &str, quantity_name: &str, value: f64) {
        *self
            .sets
            .entry(set_name.to_string())
            .or_default()
            .entry(quantity_name.to_string())
            .or_insert(0.0) += value;
    }

    #[must_use]
    pub fn get(&self, set_name: &str, quantity_name: &str) -> Option<f64> {
        self.sets.get(set_name)?.get(quantity_name).copied()
    }

    pub fn sets(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattened `(set, quantity, value)` rows in key order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.sets.iter().flat_map(|(set, quantities)| {
            quantities
                .iter()
                .map(move |(name, value)| (set.as_str(), name.as_str(), *value))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of distinct (set, quantity) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.values().map(BTreeMap::len).sum()
    }

    /// Same keys, and values equal within a relative `epsilon`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.len() == other.len()
            && self.rows().all(|(set, name, a)| {
                other
                    .get(set, name)
                    .is_some_and(|b| (a - b).abs() <= epsilon * a.abs().max(b.abs()).max(1.0))
            })
    }
}

/// Adds every named, finite member quantity of `set_id` into `result`.
///
/// The set is skipped when it is not a quantity-set or has no name; single
/// quantities are skipped when their name or value is absent. Zero counts.
pub(crate) fn accumulate_set<P: PropertyIndex + ?Sized>(
    properties: &P,
    set_id: u64,
    result: &mut AggregationResult,
) {
    let Some(set) = properties.record(set_id) else {
        return;
    };
    if !set.is_quantity_set() {
        tracing::debug!(
            set_id,
            entity_type = %set.entity_type,
            "Relating entity is not a quantity set"
        );
        return;
    }
    let Some(set_name) = set.label() else {
        return;
    };

    properties.for_each_quantity_of_set(set_id, &mut |quantity_id| {
        let (Some(name), Some(value)) = (
            properties.entity_name(quantity_id),
            properties.quantity_value(quantity_id),
        ) else {
            return;
        };
        result.add(set_name, name, value);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{other, quantity, quantity_set};
    use crate::model::{PropertyTable, QuantityKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn add_sums_into_nested_keys() {
        let mut result = AggregationResult::new();
        result.add("Qto", "area", 2.0);
        result.add("Qto", "area", 3.0);
        result.add("Qto", "volume", 1.0);
        assert_eq!(result.get("Qto", "area"), Some(5.0));
        assert_eq!(result.len(), 2);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"Qto":{"area":5.0,"volume":1.0}}"#
        );
    }

    #[test]
    fn approx_eq_tolerates_association_error() {
        let mut a = AggregationResult::new();
        a.add("Qto", "length", 0.1);
        a.add("Qto", "length", 0.2);
        a.add("Qto", "length", 0.3);
        let mut b = AggregationResult::new();
        b.add("Qto", "length", 0.3);
        b.add("Qto", "length", 0.2);
        b.add("Qto", "length", 0.1);
        assert!(a.approx_eq(&b, EPSILON));

        b.add("Qto", "area", 1.0);
        assert!(!a.approx_eq(&b, EPSILON));
    }

    #[test]
    fn accumulate_skips_unnamed_sets_and_absent_values() {
        let table: PropertyTable = [
            quantity(1, "area", QuantityKind::Area, Some(0.0)),
            quantity(2, "volume", QuantityKind::Volume, None),
            quantity(3, "", QuantityKind::Length, Some(5.0)),
            quantity_set(10, Some("Qto_Slab"), &[1, 2, 3, 404]),
            quantity_set(11, Some(""), &[1]),
            quantity_set(12, None, &[1]),
            other(13, Some("Pset_WallCommon")),
        ]
        .into_iter()
        .collect();

        let mut result = AggregationResult::new();
        for id in [10, 11, 12, 13, 14] {
            accumulate_set(&table, id, &mut result);
        }

        let rows: Vec<_> = result.rows().map(|(s, q, v)| (s.to_string(), q.to_string(), v)).collect();
        assert_eq!(rows, vec![("Qto_Slab".to_string(), "area".to_string(), 0.0)]);
    }
}
