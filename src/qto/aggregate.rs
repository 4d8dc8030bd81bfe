//! The two quantity takeoff strategies.
//!
//! Both count each distinct (selected element, quantity set) pair of a model
//! once, so they agree on every selection. They differ only in cost: the scan
//! walks every relation of each touched model, the indexed lookup touches
//! only the selected elements.

use super::index::ReverseIndex;
use super::result::{accumulate_set, AggregationResult};
use crate::model::{PropertyIndex, PropertySource, RelationKind, Selection};
use std::collections::{HashMap, HashSet};

/// Which aggregation a [`QtoEngine`](super::QtoEngine) runs on a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Strategy {
    /// Scan all defines-by-properties relations.
    Scan,
    /// Look up selected elements in the reverse index.
    #[default]
    Index,
    /// Run both, publish the indexed result, warn on disagreement.
    Both,
}

impl Strategy {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Scan => Self::Index,
            Self::Index => Self::Both,
            Self::Both => Self::Scan,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Index => "index",
            Self::Both => "both",
        }
    }
}

/// Sums quantities by scanning every defines-by-properties relation of each
/// model touched by `selection`.
pub fn aggregate_by_scan<S: PropertySource + ?Sized>(
    source: &S,
    selection: &Selection,
) -> AggregationResult {
    let mut result = AggregationResult::new();

    for (model, element_ids) in selection.iter() {
        let Some(properties) = source.properties(model) else {
            tracing::debug!(model, "No property table, skipping model");
            continue;
        };

        let mut contributed: HashSet<(u64, u64)> = HashSet::new();
        properties.for_each_relation(RelationKind::DefinesByProperties, &mut |rel| {
            let mut hits = 0usize;
            for &element_id in rel.related_ids {
                if element_ids.contains(&element_id)
                    && contributed.insert((element_id, rel.relating_id))
                {
                    hits += 1;
                }
            }
            for _ in 0..hits {
                accumulate_set(properties, rel.relating_id, &mut result);
            }
        });
    }

    result
}

/// Sums quantities using each model's precomputed [`ReverseIndex`]. Models
/// without an index contribute nothing.
pub fn aggregate_by_index<S: PropertySource + ?Sized>(
    source: &S,
    indices: &HashMap<String, ReverseIndex>,
    selection: &Selection,
) -> AggregationResult {
    let mut result = AggregationResult::new();

    for (model, element_ids) in selection.iter() {
        let (Some(properties), Some(index)) = (source.properties(model), indices.get(model))
        else {
            tracing::debug!(model, "No property table or index, skipping model");
            continue;
        };

        for &element_id in element_ids {
            let Some(set_ids) = index.get(element_id) else {
                continue;
            };
            for &set_id in set_ids {
                accumulate_set(properties, set_id, &mut result);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{model, other, quantity, quantity_set, relation, wall_model};
    use crate::model::{Model, QuantityKind};
    use crate::qto::index::build_index;
    use crate::qto::result::EPSILON;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn registry(models: Vec<Model>) -> (BTreeMap<String, Model>, HashMap<String, ReverseIndex>) {
        let indices = models
            .iter()
            .filter_map(|m| m.properties.as_ref().map(|p| (m.key.clone(), build_index(p))))
            .collect();
        let models = models.into_iter().map(|m| (m.key.clone(), m)).collect();
        (models, indices)
    }

    fn both(
        models: &BTreeMap<String, Model>,
        indices: &HashMap<String, ReverseIndex>,
        selection: &Selection,
    ) -> AggregationResult {
        let scanned = aggregate_by_scan(models, selection);
        let indexed = aggregate_by_index(models, indices, selection);
        assert!(
            scanned.approx_eq(&indexed, EPSILON),
            "scan {scanned:?} != index {indexed:?}"
        );
        indexed
    }

    /// Walls 1 and 2 each with their own set (area 20), wall 3 with nothing,
    /// slab 4 sharing one relation with wall 1, plus a property set on wall 1.
    fn building() -> Model {
        model(
            "building",
            vec![
                quantity(100, "area", QuantityKind::Area, Some(20.0)),
                quantity(101, "volume", QuantityKind::Volume, Some(40.0)),
                quantity_set(200, Some("Qto_WallBaseQuantities"), &[100, 101]),
                quantity(110, "area", QuantityKind::Area, Some(20.0)),
                quantity_set(210, Some("Qto_WallBaseQuantities"), &[110]),
                quantity(120, "count", QuantityKind::Count, Some(1.0)),
                quantity(121, "void", QuantityKind::Volume, Some(0.0)),
                quantity_set(220, Some("Qto_Shared"), &[120, 121]),
                quantity(130, "area", QuantityKind::Area, Some(99.0)),
                quantity_set(230, None, &[130]),
                other(240, Some("Pset_WallCommon")),
                relation(300, 200, &[1]),
                relation(301, 210, &[2]),
                relation(302, 220, &[1, 4]),
                relation(303, 230, &[1]),
                relation(304, 240, &[1, 2]),
            ],
        )
    }

    fn select(ids: &[u64]) -> Selection {
        let mut selection = Selection::new();
        selection.extend("building", ids.iter().copied());
        selection
    }

    #[test]
    fn single_wall() {
        let (models, indices) = registry(vec![wall_model("a")]);
        let mut selection = Selection::new();
        selection.insert("a", 1);

        let result = both(&models, &indices, &selection);
        assert_eq!(result.get("Qto_WallBaseQuantities", "area"), Some(20.0));
        assert_eq!(result.get("Qto_WallBaseQuantities", "volume"), Some(40.0));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn sums_across_elements_sharing_set_name() {
        let (models, indices) = registry(vec![building()]);
        let result = both(&models, &indices, &select(&[1, 2]));
        assert_eq!(result.get("Qto_WallBaseQuantities", "area"), Some(40.0));
        assert_eq!(result.get("Qto_WallBaseQuantities", "volume"), Some(40.0));
    }

    #[test]
    fn shared_relation_counts_each_selected_element() {
        let (models, indices) = registry(vec![building()]);
        let result = both(&models, &indices, &select(&[1, 4]));
        assert_eq!(result.get("Qto_Shared", "count"), Some(2.0));
    }

    #[test]
    fn zero_values_are_kept() {
        let (models, indices) = registry(vec![building()]);
        let result = both(&models, &indices, &select(&[4]));
        assert_eq!(result.get("Qto_Shared", "void"), Some(0.0));
    }

    #[test]
    fn unnamed_set_and_property_sets_contribute_nothing() {
        let (models, indices) = registry(vec![building()]);
        let result = both(&models, &indices, &select(&[1]));
        let sets: Vec<_> = result.sets().map(|(name, _)| name.to_string()).collect();
        assert_eq!(sets, vec!["Qto_Shared", "Qto_WallBaseQuantities"]);
        assert_eq!(result.get("Qto_WallBaseQuantities", "area"), Some(20.0));
    }

    #[test]
    fn element_without_relations_adds_nothing() {
        let (models, indices) = registry(vec![building()]);
        let with_three = both(&models, &indices, &select(&[2, 3]));
        let without = both(&models, &indices, &select(&[2]));
        assert_eq!(with_three, without);
        assert!(both(&models, &indices, &select(&[3])).is_empty());
    }

    #[test]
    fn empty_selection_gives_empty_result() {
        let (models, indices) = registry(vec![building()]);
        assert!(both(&models, &indices, &Selection::new()).is_empty());
    }

    #[test]
    fn unknown_or_unloaded_models_are_skipped() {
        let bare = Model::new(
            "bare".to_string(),
            "bare".to_string(),
            "IFC4".to_string(),
            "bare.ifc".to_string(),
        );
        let (models, indices) = registry(vec![wall_model("a"), bare]);
        let mut selection = Selection::new();
        selection.insert("a", 1);
        selection.insert("bare", 1);
        selection.insert("ghost", 1);

        let result = both(&models, &indices, &selection);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn missing_index_skips_model_for_indexed_strategy() {
        let (models, _) = registry(vec![wall_model("a")]);
        let mut selection = Selection::new();
        selection.insert("a", 1);

        assert!(aggregate_by_index(&models, &HashMap::new(), &selection).is_empty());
        assert!(!aggregate_by_scan(&models, &selection).is_empty());
    }

    #[test]
    fn repeated_aggregation_is_idempotent() {
        let (models, indices) = registry(vec![building()]);
        let selection = select(&[1, 2, 4]);
        assert_eq!(
            aggregate_by_scan(&models, &selection),
            aggregate_by_scan(&models, &selection)
        );
        assert_eq!(
            aggregate_by_index(&models, &indices, &selection),
            aggregate_by_index(&models, &indices, &selection)
        );
    }

    #[test]
    fn same_set_via_two_relations_counts_once_per_element() {
        let (models, indices) = registry(vec![model(
            "dup",
            vec![
                quantity(1, "area", QuantityKind::Area, Some(5.0)),
                quantity_set(2, Some("Qto"), &[1]),
                relation(3, 2, &[10]),
                relation(4, 2, &[10, 10]),
            ],
        )]);
        let mut selection = Selection::new();
        selection.insert("dup", 10);

        let result = both(&models, &indices, &selection);
        assert_eq!(result.get("Qto", "area"), Some(5.0));
    }

    #[test]
    fn strategy_cycles() {
        assert_eq!(Strategy::Scan.next(), Strategy::Index);
        assert_eq!(Strategy::Index.next().next(), Strategy::Scan);
    }
}
