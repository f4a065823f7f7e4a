//! Sample Matrix
//!
//! Provides a typed row-major view over a flat multi-axis sample window.
//! Rows are timesteps, columns are axes.

mod matrix;

pub use matrix::{Column, SampleMatrix};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while shaping a raw window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Buffer length is not a whole number of rows
    #[error("raw buffer of {len} samples is not divisible into {columns} axes")]
    RaggedBuffer { len: usize, columns: usize },

    /// At least one axis is required
    #[error("axis count must be positive")]
    NoColumns,
}

/// One named axis pulled out of a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl AxisSeries {
    /// Create a series from a name and its values
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
