use crate::error::ParseError;
use crate::model::{
    Element, EntityKind, Model, PropertyRecord, PropertyTable, QuantityKind, RelationKind,
};
use crate::parser::step::{StepEntity, StepFile, StepValue};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Length of an `IfcGloballyUniqueId`.
const GLOBAL_ID_LEN: usize = 22;

/// Loads an IFC file into a [`Model`] keyed by the file stem.
///
/// # Errors
///
/// Returns [`ParseError::FileRead`] if the file cannot be read.
/// Returns [`ParseError::InvalidStep`] if the STEP format is malformed.
///
/// # Example
///
/// ```no_run
/// use ifc_qto::parser::load_ifc_file;
///
/// let model = load_ifc_file("wall.ifc")?;
/// println!("{}: {} elements", model.key, model.total_elements());
/// # Ok::<(), ifc_qto::error::ParseError>(())
/// ```
pub fn load_ifc_file<P: AsRef<Path>>(path: P) -> Result<Model, ParseError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let key = path
        .file_stem()
        .map_or_else(|| "model".to_string(), |s| s.to_string_lossy().to_string());

    load_model(&key, &content, &path.to_string_lossy())
}

/// Builds a [`Model`] from STEP text: the full property table plus the
/// elements that relations point at.
pub fn load_model(key: &str, content: &str, file_path: &str) -> Result<Model, ParseError> {
    let step_file = StepFile::parse(content)?;

    let table: PropertyTable = step_file.entities.values().map(to_record).collect();
    let elements = extract_elements(&step_file, &table);

    tracing::info!(
        model = key,
        schema = %step_file.schema,
        entities = table.len(),
        elements = elements.len(),
        "Loaded model"
    );

    let mut model = Model::new(
        key.to_string(),
        extract_project_name(&step_file),
        step_file.schema.clone(),
        file_path.to_string(),
    )
    .with_properties(table);
    model.elements = elements;

    Ok(model)
}

fn to_record(entity: &StepEntity) -> PropertyRecord {
    let kind = match entity.entity_type.as_str() {
        // [4]=RelatedObjects, [5]=RelatingPropertyDefinition
        "IFCRELDEFINESBYPROPERTIES" => relation(entity, RelationKind::DefinesByProperties),
        // [4]=RelatedElements, [5]=RelatingStructure
        "IFCRELCONTAINEDINSPATIALSTRUCTURE" => {
            relation(entity, RelationKind::ContainedInSpatialStructure)
        }
        // [2]=Name, [5]=Quantities
        "IFCELEMENTQUANTITY" => EntityKind::QuantitySet {
            member_ids: entity.references_at(5),
        },
        other => match QuantityKind::from_ifc_type(other) {
            // [0]=Name, [3]=Value
            Some(kind) => EntityKind::QuantityValue {
                kind,
                value: entity
                    .values
                    .get(3)
                    .and_then(StepValue::as_number)
                    .filter(|v| v.is_finite()),
            },
            None => EntityKind::Other,
        },
    };

    let name = entity_name(entity, &kind).map(str::to_string);

    PropertyRecord {
        id: entity.id,
        entity_type: entity.entity_type.clone(),
        name,
        kind,
    }
}

fn relation(entity: &StepEntity, kind: RelationKind) -> EntityKind {
    EntityKind::Relation {
        kind,
        relating_id: entity.reference_at(5),
        related_ids: entity.references_at(4),
    }
}

/// Rooted entities carry their name at [2] after GlobalId and OwnerHistory;
/// resources such as quantities and properties at [0].
fn entity_name<'a>(entity: &'a StepEntity, kind: &EntityKind) -> Option<&'a str> {
    let rooted = match kind {
        EntityKind::Relation { .. } | EntityKind::QuantitySet { .. } => true,
        EntityKind::QuantityValue { .. } => false,
        EntityKind::Other => {
            entity.values.len() > 2
                && entity
                    .string_at(0)
                    .is_some_and(|s| s.len() == GLOBAL_ID_LEN)
        }
    };
    entity.string_at(if rooted { 2 } else { 0 })
}

fn extract_project_name(step_file: &StepFile) -> String {
    step_file
        .entities_of_type("IFCPROJECT")
        .next()
        .and_then(|e| e.string_at(2))
        .map_or_else(|| "Unknown Project".to_string(), str::to_string)
}

/// Elements are the objects that spatial containment or property relations
/// point at.
fn extract_elements(step_file: &StepFile, table: &PropertyTable) -> Vec<Element> {
    let mut element_ids: BTreeSet<u64> = BTreeSet::new();
    let mut element_to_storey: HashMap<u64, u64> = HashMap::new();

    for record in table.records() {
        if let EntityKind::Relation {
            kind,
            relating_id,
            related_ids,
        } = &record.kind
        {
            element_ids.extend(related_ids.iter().copied());
            if let (RelationKind::ContainedInSpatialStructure, Some(structure)) =
                (kind, relating_id)
            {
                for &id in related_ids {
                    element_to_storey.insert(id, *structure);
                }
            }
        }
    }

    let mut elements: Vec<Element> = element_ids
        .into_iter()
        .filter_map(|id| step_file.get_entity(id))
        .filter(|entity| !entity.entity_type.ends_with("TYPE"))
        .map(|entity| {
            let storey = element_to_storey
                .get(&entity.id)
                .and_then(|sid| step_file.get_entity(*sid))
                .and_then(|s| s.string_at(2))
                .map(str::to_string);

            Element {
                id: entity.id,
                global_id: entity.string_at(0).unwrap_or_default().to_string(),
                name: entity
                    .string_at(2)
                    .map_or_else(|| format!("#{}", entity.id), str::to_string),
                entity_type: entity.entity_type.clone(),
                storey,
            }
        })
        .collect();

    elements.sort_by(|a, b| a.entity_type.cmp(&b.entity_type).then(a.id.cmp(&b.id)));
    elements
}
