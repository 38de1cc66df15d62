//! Windowing module.
//!
//! Turns a percent-change table into overlapping fixed-length windows,
//! each labeled with the direction of the next move per market.

pub mod labeled;

pub use labeled::{
    window_and_label, window_and_label_rows, LabeledWindows, Window, WindowConfig, WindowError,
    DEFAULT_WINDOW_SIZE,
};
