use super::{Element, PropertyIndex, PropertyTable};
use serde::Serialize;
use std::collections::BTreeMap;

/// A loaded model: one property table plus the elements it describes.
///
/// `properties` is `None` until a loader attaches a table; such a model
/// contributes nothing to a takeoff.
#[derive(Debug, Serialize)]
pub struct Model {
    pub key: String,
    pub name: String,
    pub schema: String,
    pub file_path: String,
    #[serde(skip)]
    pub properties: Option<PropertyTable>,
    pub elements: Vec<Element>,
}

impl Model {
    #[must_use]
    pub fn new(key: String, name: String, schema: String, file_path: String) -> Self {
        Self {
            key,
            name,
            schema,
            file_path,
            properties: None,
            elements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: PropertyTable) -> Self {
        self.properties = Some(properties);
        self
    }

    #[must_use]
    pub fn element(&self, id: u64) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.elements.iter().map(|e| e.id)
    }

    #[must_use]
    pub fn total_elements(&self) -> usize {
        self.elements.len()
    }
}

/// Resolves a model key to its property table.
pub trait PropertySource {
    type Index: PropertyIndex;

    fn properties(&self, model: &str) -> Option<&Self::Index>;
}

impl PropertySource for BTreeMap<String, Model> {
    type Index = PropertyTable;

    fn properties(&self, model: &str) -> Option<&PropertyTable> {
        self.get(model).and_then(|m| m.properties.as_ref())
    }
}
