pub mod ifc;
pub mod step;

pub use crate::error::ParseError;
pub use ifc::{load_ifc_file, load_model};
pub use step::{StepEntity, StepFile, StepValue};
