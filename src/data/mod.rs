pub mod loader;
pub mod types;

pub use loader::{
    LoadedObservations, LoaderConfig, LoaderError, ObservationLoader, DEFAULT_EXPECTED_FIELDS,
};
pub use types::{Direction, LabelVector, Observations, ShapeError};
