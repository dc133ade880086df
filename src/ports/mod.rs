//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the inference pipeline and the trained model it wraps.

mod model;

pub use model::{ModelError, RiskModel};
