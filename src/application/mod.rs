//! Application layer: The inference pipeline and its preprocessing stages.
//!
//! Stages run in this order for every record:
//! normalizer (uses the encoder) -> synthesizer (engineered models only)
//! -> classifier.

pub mod classifier;
pub mod encoder;
pub mod normalizer;
mod pipeline;
pub mod synthesizer;

pub use classifier::{classify, ThresholdClassifier};
pub use encoder::{encode_sex, resolve_sex};
pub use normalizer::SchemaNormalizer;
pub use pipeline::InferencePipeline;
pub use synthesizer::synthesize;
