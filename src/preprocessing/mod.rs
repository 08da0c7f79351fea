//! Scan normalization
//!
//! Turns a raw color scan into a binarized, perspective-corrected canvas of
//! fixed size so the sheet layout can be overlaid on it.

pub mod pipeline;
pub mod steps;

pub use pipeline::{FallbackReason, NormalizationOutcome, NormalizedSheet, Normalizer, StepTiming};
