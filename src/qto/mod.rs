//! Quantity takeoff: sums named quantities of the quantity sets attached to
//! a selection of elements, grouped by set name.

pub mod aggregate;
pub mod engine;
pub mod index;
pub mod kinds;
pub mod result;

pub use aggregate::{aggregate_by_index, aggregate_by_scan, Strategy};
pub use engine::{QtoEngine, Ticket};
pub use index::{build_index, ReverseIndex};
pub use kinds::QuantityKinds;
pub use result::{AggregationResult, EPSILON};
