//! Domain layer: Core types and layout constants.
//!
//! This module contains pure Rust types with no I/O.
//! All types are serializable where they cross the crate boundary.

mod fill_values;
mod frame;
mod prediction;
mod record;
pub mod schema;
mod sex;

pub use fill_values::{FillValueMap, DEFAULT_FILL_VALUES};
pub use frame::FeatureFrame;
pub use prediction::{
    format_percentage, round_probability, BatchPrediction, ModelInfo, PredictionResult, RiskLevel,
};
pub use record::{FieldValue, Record, RecordId};
pub use schema::FeatureSet;
pub use sex::{Sex, SexInput};
