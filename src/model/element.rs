use serde::Serialize;

/// A building element that relations in the property table can point at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: u64,
    pub global_id: String,
    pub name: String,
    pub entity_type: String,
    pub storey: Option<String>,
}
