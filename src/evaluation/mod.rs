//! Evaluation module.
//!
//! Scores a trained forecaster against labeled windows, per true direction.

pub mod accuracy;

pub use accuracy::{evaluate, score, AccuracyReport, ClassAccuracy, ClassCounts};
