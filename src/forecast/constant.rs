//! Constant-guess baseline.
//!
//! Predicts the same direction for every market regardless of the window.
//! Useful as a floor when comparing real classifiers.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::{Direction, LabelVector};
use crate::windowing::{LabeledWindows, Window};

use super::{ForecastError, Forecaster};

/// Constant-guess configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantGuessConfig {
    /// Direction predicted for every market.
    pub guess: Direction,
}

impl Default for ConstantGuessConfig {
    fn default() -> Self {
        Self {
            guess: Direction::Flat,
        }
    }
}

/// Trained state.
#[derive(Debug, Clone, Copy)]
struct Fitted {
    guess: Direction,
    /// Market count seen during training, if there was any data.
    num_markets: Option<usize>,
}

/// Baseline forecaster returning a fixed direction.
#[derive(Debug, Clone)]
pub struct ConstantGuess {
    config: ConstantGuessConfig,
    fitted: Option<Fitted>,
}

impl ConstantGuess {
    pub fn new(config: ConstantGuessConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    /// Direction that will be predicted once trained.
    pub fn guess(&self) -> Direction {
        self.config.guess
    }
}

impl Default for ConstantGuess {
    fn default() -> Self {
        Self::new(ConstantGuessConfig::default())
    }
}

impl Forecaster for ConstantGuess {
    fn name(&self) -> &str {
        "constant-guess"
    }

    fn train(&mut self, data: &LabeledWindows<'_>) -> Result<(), ForecastError> {
        let num_markets = (!data.is_empty()).then(|| data.num_markets());

        info!(
            "Training {} on {} windows: guessing {} for every market",
            self.name(),
            data.len(),
            self.config.guess.as_str()
        );

        self.fitted = Some(Fitted {
            guess: self.config.guess,
            num_markets,
        });
        Ok(())
    }

    fn forecast(&self, window: &Window<'_>) -> Result<LabelVector, ForecastError> {
        let fitted = self
            .fitted
            .ok_or_else(|| ForecastError::NotTrained(self.name().to_string()))?;

        if let Some(expected) = fitted.num_markets {
            if window.num_markets() != expected {
                return Err(ForecastError::MarketMismatch {
                    expected,
                    found: window.num_markets(),
                });
            }
        }

        Ok(LabelVector::uniform(fitted.guess, window.num_markets()))
    }
}
