//! Sliding-window labeling.
//!
//! Splits an observation table into overlapping windows of `window_size`
//! time points. Each window is paired with the sign pattern of the time
//! point immediately after it: +1 where the market went up, 0 where it
//! did not move, -1 where it went down.
//!
//! Consecutive windows share `window_size - 1` time points, so the samples
//! are not independent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{LabelVector, Observations, ShapeError};

/// Window length used when none is configured.
pub const DEFAULT_WINDOW_SIZE: usize = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Shape mismatch: {0}")]
    Shape(#[from] ShapeError),

    #[error("Window size must be positive")]
    ZeroWindowSize,
}

/// Windowing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Time points per window.
    pub window_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Borrowed view of `window_size` consecutive time points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    start: usize,
    values: &'a [f64],
    num_markets: usize,
}

impl<'a> Window<'a> {
    /// Index of the first time point in the source table.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of time points in the window.
    pub fn len(&self) -> usize {
        if self.num_markets == 0 {
            0
        } else {
            self.values.len() / self.num_markets
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn num_markets(&self) -> usize {
        self.num_markets
    }

    pub fn row(&self, t: usize) -> Option<&'a [f64]> {
        if t >= self.len() {
            return None;
        }
        let values = self.values;
        Some(&values[t * self.num_markets..(t + 1) * self.num_markets])
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [f64]> + 'a {
        let values = self.values;
        values.chunks_exact(self.num_markets.max(1))
    }

    /// Most recent time point in the window.
    pub fn last_row(&self) -> Option<&'a [f64]> {
        self.len().checked_sub(1).and_then(|t| self.row(t))
    }

    /// Window contents as a row-major slice.
    pub fn as_slice(&self) -> &'a [f64] {
        self.values
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }
}

/// Windows and their next-step labels, index-aligned.
#[derive(Debug, Clone)]
pub struct LabeledWindows<'a> {
    pub window_size: usize,
    pub windows: Vec<Window<'a>>,
    pub labels: Vec<LabelVector>,
}

impl<'a> LabeledWindows<'a> {
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn num_markets(&self) -> usize {
        self.labels.first().map(LabelVector::len).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Window<'a>, &LabelVector)> {
        self.windows.iter().zip(self.labels.iter())
    }
}

/// Produce every window of `window_size` time points together with the
/// direction of the time point that follows it.
///
/// Returns `T - window_size` pairs in increasing start order, or none at
/// all when `window_size >= T`.
pub fn window_and_label(
    observations: &Observations,
    window_size: usize,
) -> Result<LabeledWindows<'_>, WindowError> {
    if window_size == 0 {
        return Err(WindowError::ZeroWindowSize);
    }

    let num_time_points = observations.num_time_points();
    let num_markets = observations.num_markets();
    let count = num_time_points.saturating_sub(window_size);

    let mut windows = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);

    for start in 0..count {
        let end = start + window_size;
        windows.push(Window {
            start,
            values: observations.rows_slice(start, end),
            num_markets,
        });
        labels.push(LabelVector::from_changes(observations.rows_slice(end, end + 1)));
    }

    Ok(LabeledWindows {
        window_size,
        windows,
        labels,
    })
}

/// Same as [`window_and_label`] for raw rows, which are checked for a
/// rectangular shape first.
pub fn window_and_label_rows(
    rows: Vec<Vec<f64>>,
    window_size: usize,
) -> Result<(Vec<Vec<Vec<f64>>>, Vec<Vec<i8>>), WindowError> {
    let observations = Observations::from_rows(rows)?;
    let labeled = window_and_label(&observations, window_size)?;

    let windows = labeled.windows.iter().map(Window::to_rows).collect();
    let labels = labeled.labels.iter().map(LabelVector::to_i8).collect();
    Ok((windows, labels))
}
