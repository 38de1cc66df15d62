pub mod config;
pub mod data;
pub mod evaluation;
pub mod forecast;
pub mod windowing;

// Re-export commonly used types
pub use config::{ConfigError, ForecastConfig};
pub use data::{
    Direction, LabelVector, LoadedObservations, LoaderError, ObservationLoader, Observations,
};
pub use evaluation::{evaluate, AccuracyReport};
pub use forecast::{ConstantGuess, ForecastError, Forecaster};
pub use windowing::{window_and_label, LabeledWindows, Window, WindowError};
