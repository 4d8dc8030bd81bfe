//! Record builders shared by unit tests.

use super::{EntityKind, Model, PropertyRecord, PropertyTable, QuantityKind, RelationKind};

pub fn quantity(id: u64, name: &str, kind: QuantityKind, value: Option<f64>) -> PropertyRecord {
    PropertyRecord {
        id,
        entity_type: "IFCQUANTITY".to_string(),
        name: Some(name.to_string()),
        kind: EntityKind::QuantityValue { kind, value },
    }
}

pub fn quantity_set(id: u64, name: Option<&str>, members: &[u64]) -> PropertyRecord {
    PropertyRecord {
        id,
        entity_type: "IFCELEMENTQUANTITY".to_string(),
        name: name.map(str::to_string),
        kind: EntityKind::QuantitySet {
            member_ids: members.to_vec(),
        },
    }
}

pub fn relation(id: u64, relating: u64, related: &[u64]) -> PropertyRecord {
    PropertyRecord {
        id,
        entity_type: "IFCRELDEFINESBYPROPERTIES".to_string(),
        name: None,
        kind: EntityKind::Relation {
            kind: RelationKind::DefinesByProperties,
            relating_id: Some(relating),
            related_ids: related.to_vec(),
        },
    }
}

pub fn other(id: u64, name: Option<&str>) -> PropertyRecord {
    PropertyRecord {
        id,
        entity_type: "IFCPROPERTYSET".to_string(),
        name: name.map(str::to_string),
        kind: EntityKind::Other,
    }
}

pub fn model(key: &str, records: Vec<PropertyRecord>) -> Model {
    Model::new(
        key.to_string(),
        key.to_string(),
        "IFC4".to_string(),
        format!("{key}.ifc"),
    )
    .with_properties(records.into_iter().collect::<PropertyTable>())
}

/// One wall (element 1) with area 20 and volume 40.
pub fn wall_model(key: &str) -> Model {
    model(
        key,
        vec![
            quantity(100, "area", QuantityKind::Area, Some(20.0)),
            quantity(101, "volume", QuantityKind::Volume, Some(40.0)),
            quantity_set(200, Some("Qto_WallBaseQuantities"), &[100, 101]),
            relation(300, 200, &[1]),
        ],
    )
}
