pub mod element;
pub mod project;
pub mod record;
pub mod selection;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

pub use element::Element;
pub use project::{Model, PropertySource};
pub use record::{EntityKind, PropertyRecord, QuantityKind, RelationKind};
pub use selection::{Selection, SelectionArg, SelectionIds};
pub use table::{PropertyIndex, PropertyTable, RelationRef};
