//! Adapters layer: Concrete implementations of ports and artifact readers.
//!
//! - `model`: JSON model artifacts (random forest, logistic regression)
//! - `artifacts`: persisted threshold and fill values
//! - `table`: CSV batch input

pub mod artifacts;
pub mod model;
pub mod table;

pub use artifacts::{FillValueStore, ThresholdStore};
pub use model::{load_model, LoadedModel, ModelArtifact};
pub use table::read_csv_records;
