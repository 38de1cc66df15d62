//! Loader for comma-separated percent-change files.
//!
//! Each usable row has a leading label column (usually a date) followed by
//! one percent change per market:
//! - date, market_1, market_2, market_3, market_4
//!
//! Fields are split on every comma; quotes are not special. Rows with any
//! other field count are skipped. Blank lines are dropped by the reader and
//! are not counted as skipped rows. A numeric field that does not parse is
//! an error for the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::types::{Observations, ShapeError};

/// Default number of fields in a usable row: one label plus four markets.
pub const DEFAULT_EXPECTED_FIELDS: usize = 5;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid number {value:?} on line {line}, field {field}")]
    InvalidNumber {
        line: u64,
        field: usize,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Invalid loader configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Field count of a usable row, label column included.
    pub expected_fields: usize,
    /// Skip the first line as a header.
    pub has_headers: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            expected_fields: DEFAULT_EXPECTED_FIELDS,
            has_headers: false,
        }
    }
}

impl LoaderConfig {
    /// Markets per row implied by the field count.
    pub fn num_markets(&self) -> usize {
        self.expected_fields.saturating_sub(1)
    }
}

/// Result of loading a file.
#[derive(Debug, Clone)]
pub struct LoadedObservations {
    /// Contents of the label column, one per kept row.
    pub row_labels: Vec<String>,
    pub observations: Observations,
    /// Non-blank rows dropped for having the wrong field count.
    pub skipped_rows: usize,
}

/// Reads percent-change observations from delimited text.
pub struct ObservationLoader {
    config: LoaderConfig,
}

impl ObservationLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load observations from a file on disk.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedObservations, LoaderError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let loaded = self.load_from_reader(file)?;

        info!(
            "Loaded {} time points x {} markets from {} ({} rows skipped)",
            loaded.observations.num_time_points(),
            loaded.observations.num_markets(),
            path.display(),
            loaded.skipped_rows
        );

        Ok(loaded)
    }

    /// Load observations from any reader.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<LoadedObservations, LoaderError> {
        if self.config.expected_fields < 2 {
            return Err(LoaderError::InvalidConfig(format!(
                "expected_fields must be at least 2, got {}",
                self.config.expected_fields
            )));
        }

        let num_markets = self.config.num_markets();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.config.has_headers)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut row_labels = Vec::new();
        let mut values = Vec::new();
        let mut skipped_rows = 0;

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.len() != self.config.expected_fields {
                debug!(
                    "Skipping line {}: {} fields, expected {}",
                    line,
                    record.len(),
                    self.config.expected_fields
                );
                skipped_rows += 1;
                continue;
            }

            for (field, raw) in record.iter().enumerate().skip(1) {
                let value = raw.parse::<f64>().map_err(|_| LoaderError::InvalidNumber {
                    line,
                    field,
                    value: raw.to_string(),
                })?;
                values.push(value);
            }
            row_labels.push(record.get(0).unwrap_or_default().to_string());
        }

        let observations = Observations::from_flat(values, num_markets)?;

        Ok(LoadedObservations {
            row_labels,
            observations,
            skipped_rows,
        })
    }
}

impl Default for ObservationLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
2016-01-04,0.5,-0.25,0,1.5
2016-01-05,-1.0,0.75,0.1,0
2016-01-06,0,0,-0.3,2.25
";

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.expected_fields, 5);
        assert_eq!(config.num_markets(), 4);
        assert!(!config.has_headers);
    }

    #[test]
    fn test_load_from_reader() {
        let loaded = ObservationLoader::default()
            .load_from_reader(SAMPLE.as_bytes())
            .unwrap();

        assert_eq!(loaded.observations.shape(), (3, 4));
        assert_eq!(loaded.skipped_rows, 0);
        assert_eq!(loaded.row_labels[0], "2016-01-04");
        assert_eq!(loaded.observations.row(1), Some(&[-1.0, 0.75, 0.1, 0.0][..]));
    }

    #[test]
    fn test_skips_rows_with_wrong_field_count() {
        let data = "\
header,with,only,four
2016-01-04,0.5,-0.25,0,1.5
2016-01-05,1,2,3,4,5
2016-01-06,0,0,-0.3,2.25
";
        let loaded = ObservationLoader::default()
            .load_from_reader(data.as_bytes())
            .unwrap();

        assert_eq!(loaded.observations.num_time_points(), 2);
        assert_eq!(loaded.skipped_rows, 2);
        assert_eq!(loaded.row_labels, vec!["2016-01-04", "2016-01-06"]);
    }

    #[test]
    fn test_quoted_comma_counts_as_separator() {
        let data = "\"2016,01\",1,2,3,4\n2016-02,1,2,3,4\n";
        let loaded = ObservationLoader::default()
            .load_from_reader(data.as_bytes())
            .unwrap();

        assert_eq!(loaded.skipped_rows, 1);
        assert_eq!(loaded.row_labels, vec!["2016-02"]);
    }

    #[test]
    fn test_quoted_number_is_not_a_number() {
        let data = "d,\"1.5\",2,3,4\n";
        let err = ObservationLoader::default()
            .load_from_reader(data.as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidNumber { field: 1, .. }));
    }

    #[test]
    fn test_blank_lines_are_not_counted() {
        let data = "d0,1,2,3,4\n\n\nd1,1,2,3,4\n\n";
        let loaded = ObservationLoader::default()
            .load_from_reader(data.as_bytes())
            .unwrap();

        assert_eq!(loaded.observations.num_time_points(), 2);
        assert_eq!(loaded.skipped_rows, 0);
    }

    #[test]
    fn test_trims_whitespace() {
        let data = "d, 0.5 ,-0.25 , 0,1.5\r\n";
        let loaded = ObservationLoader::default()
            .load_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(loaded.observations.row(0), Some(&[0.5, -0.25, 0.0, 1.5][..]));
    }

    #[test]
    fn test_non_numeric_field_is_fatal() {
        let data = "\
2016-01-04,0.5,-0.25,0,1.5
2016-01-05,0.5,abc,0,1.5
";
        let err = ObservationLoader::default()
            .load_from_reader(data.as_bytes())
            .unwrap_err();

        match err {
            LoaderError::InvalidNumber { line, field, value } => {
                assert_eq!(line, 2);
                assert_eq!(field, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input() {
        let loaded = ObservationLoader::default()
            .load_from_reader("".as_bytes())
            .unwrap();
        assert_eq!(loaded.observations.shape(), (0, 4));
        assert!(loaded.row_labels.is_empty());
    }

    #[test]
    fn test_custom_field_count() {
        let loader = ObservationLoader::new(LoaderConfig {
            expected_fields: 3,
            has_headers: true,
        });
        let data = "date,a,b\nd1,1,-1\nd2,0,2\n";
        let loaded = loader.load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(loaded.observations.shape(), (2, 2));
    }

    #[test]
    fn test_rejects_degenerate_config() {
        let loader = ObservationLoader::new(LoaderConfig {
            expected_fields: 1,
            has_headers: false,
        });
        assert!(matches!(
            loader.load_from_reader("x\n".as_bytes()),
            Err(LoaderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ObservationLoader::default()
            .load("does/not/exist.csv")
            .unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
    }
}
