//! Forecasting module.
//!
//! A forecaster is trained once on labeled windows and then predicts a
//! direction per market for any window:
//! - `Forecaster`: the train/forecast seam
//! - `ConstantGuess`: baseline that predicts one fixed direction everywhere

pub mod constant;

use thiserror::Error;

use crate::data::LabelVector;
use crate::windowing::{LabeledWindows, Window};

pub use constant::{ConstantGuess, ConstantGuessConfig};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Forecaster {0} has not been trained")]
    NotTrained(String),

    #[error("Window has {found} markets, forecaster was trained on {expected}")]
    MarketMismatch { expected: usize, found: usize },
}

/// Train/forecast seam for direction classifiers.
///
/// Implementors own whatever state training produces; `forecast` only reads
/// it, so one trained forecaster can serve many windows concurrently.
pub trait Forecaster: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Fit on the given windows. Called once before any forecast.
    fn train(&mut self, data: &LabeledWindows<'_>) -> Result<(), ForecastError>;

    /// Predict the next direction per market for `window`.
    fn forecast(&self, window: &Window<'_>) -> Result<LabelVector, ForecastError>;
}
