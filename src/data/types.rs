//! Core data types for windowed direction labeling.
//!
//! Observations are stored row-major in a single buffer so that windows can
//! be handed out as borrowed slices without copying.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shape problems found while building an observation table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Row {row} has {found} markets, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Buffer of {len} values is not divisible into rows of {num_markets} markets")]
    Indivisible { len: usize, num_markets: usize },

    #[error("Observations must have at least one market column")]
    NoMarkets,
}

/// Direction of a single price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Flat,
    Down,
}

impl Direction {
    /// All directions, in the order accuracy is reported.
    pub const ALL: [Direction; 3] = [Direction::Up, Direction::Down, Direction::Flat];

    /// Sign of a percent change, with sign(0) = Flat.
    ///
    /// NaN compares false both ways and therefore also maps to Flat.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "+1" | "1" => Some(Self::Up),
            "flat" | "0" => Some(Self::Flat),
            "down" | "-1" => Some(Self::Down),
            _ => None,
        }
    }

    /// Numeric label: +1, 0 or -1.
    pub fn as_i8(&self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Flat => 0,
            Self::Down => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "+1",
            Self::Flat => "0",
            Self::Down => "-1",
        }
    }
}

/// Per-market directions for one time point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelVector(pub Vec<Direction>);

impl LabelVector {
    /// Sign pattern of a row of percent changes.
    pub fn from_changes(changes: &[f64]) -> Self {
        Self(changes.iter().copied().map(Direction::from_change).collect())
    }

    /// Same direction for every market.
    pub fn uniform(direction: Direction, num_markets: usize) -> Self {
        Self(vec![direction; num_markets])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, market: usize) -> Option<Direction> {
        self.0.get(market).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.0.iter().copied()
    }

    /// Numeric form, one of +1/0/-1 per market.
    pub fn to_i8(&self) -> Vec<i8> {
        self.0.iter().map(Direction::as_i8).collect()
    }
}

/// Rectangular table of percent changes: time points x markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observations {
    values: Vec<f64>,
    num_markets: usize,
}

impl Observations {
    /// Build from one vector per time point. Every row must have the same
    /// number of markets, and at least one.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ShapeError> {
        let num_markets = match rows.first() {
            Some(first) if first.is_empty() => return Err(ShapeError::NoMarkets),
            Some(first) => first.len(),
            None => return Ok(Self::empty(0)),
        };

        let mut values = Vec::with_capacity(rows.len() * num_markets);
        for (row, changes) in rows.into_iter().enumerate() {
            if changes.len() != num_markets {
                return Err(ShapeError::Ragged {
                    row,
                    expected: num_markets,
                    found: changes.len(),
                });
            }
            values.extend(changes);
        }

        Ok(Self {
            values,
            num_markets,
        })
    }

    /// Build from a row-major buffer.
    pub fn from_flat(values: Vec<f64>, num_markets: usize) -> Result<Self, ShapeError> {
        if num_markets == 0 {
            if values.is_empty() {
                return Ok(Self::empty(0));
            }
            return Err(ShapeError::NoMarkets);
        }
        if values.len() % num_markets != 0 {
            return Err(ShapeError::Indivisible {
                len: values.len(),
                num_markets,
            });
        }
        Ok(Self {
            values,
            num_markets,
        })
    }

    /// Table with no time points.
    pub fn empty(num_markets: usize) -> Self {
        Self {
            values: Vec::new(),
            num_markets,
        }
    }

    /// Number of time points (T).
    pub fn num_time_points(&self) -> usize {
        if self.num_markets == 0 {
            0
        } else {
            self.values.len() / self.num_markets
        }
    }

    /// Number of markets (M).
    pub fn num_markets(&self) -> usize {
        self.num_markets
    }

    /// `(T, M)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_time_points(), self.num_markets)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Percent changes for all markets at time point `t`.
    pub fn row(&self, t: usize) -> Option<&[f64]> {
        let start = t.checked_mul(self.num_markets)?;
        let end = start.checked_add(self.num_markets)?;
        self.values.get(start..end).filter(|_| self.num_markets > 0)
    }

    /// Rows `start..end` as a row-major slice.
    pub(crate) fn rows_slice(&self, start: usize, end: usize) -> &[f64] {
        &self.values[start * self.num_markets..end * self.num_markets]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact panics on zero, and a zero-market table has no rows anyway.
        self.values.chunks_exact(self.num_markets.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Percent-change series for one market.
    pub fn column(&self, market: usize) -> Option<Vec<f64>> {
        if market >= self.num_markets {
            return None;
        }
        Some(self.rows().map(|r| r[market]).collect())
    }
}
