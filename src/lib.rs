//! # IFC QTO
//!
//! Quantity takeoff for IFC models: sums the named quantities (area, volume,
//! length, count, ...) of the quantity sets attached to a selection of
//! building elements, grouped by quantity-set name.
//!
//! ## Features
//!
//! - Load IFC files (IFC2x3 and IFC4 STEP) into a property table
//! - Two aggregation strategies: a relation scan and a precomputed reverse index
//! - Selection events with supersede/clear semantics
//! - Export to CSV and JSON, or browse interactively in the terminal
//!
//! ## Example
//!
//! ```no_run
//! use ifc_qto::model::Selection;
//! use ifc_qto::parser::load_ifc_file;
//! use ifc_qto::qto::{QtoEngine, Strategy};
//!
//! let mut engine = QtoEngine::new(Strategy::Index);
//! engine.add_model(load_ifc_file("wall.ifc").expect("Failed to load"));
//!
//! let selection = Selection::from_text_ids([("wall", ["186"])]);
//! for (set, quantity, value) in engine.on_highlight(&selection).rows() {
//!     println!("{set} / {quantity}: {value:.2}");
//! }
//! ```

pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod qto;
pub mod ui;
