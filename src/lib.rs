//! Optical mark recognition grading for multiple-choice answer sheets
//!
//! A scanned answer key and a scanned response are each normalized onto a
//! fixed canvas, read question by question from ink density, and compared.

pub mod canvas;
pub mod comparison;
pub mod config;
pub mod debug;
pub mod error;
pub mod extraction;
pub mod grading;
pub mod layout;
pub mod preprocessing;
pub mod server;

pub use canvas::BinaryCanvas;
pub use comparison::{compare, ScoreReport};
pub use error::GradeError;
pub use extraction::{extract, AnswerSequence};
pub use grading::{grade, Grader, SheetRole};
pub use layout::SheetLayout;
pub use preprocessing::{NormalizationOutcome, Normalizer};
