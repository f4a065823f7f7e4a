//! Per-Axis Scaling and Smoothing

use crate::smoothing::BoxFilter;
use sample_matrix::AxisSeries;

/// Transformation applied to every axis of a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTransform {
    /// Multiplicative factor applied to each sample
    scale: f64,
    /// Smoothing pass run after scaling, if enabled
    smoothing: Option<BoxFilter>,
}

impl AxisTransform {
    /// Scale only
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            smoothing: None,
        }
    }

    /// Add a smoothing pass after scaling
    pub fn with_smoothing(mut self, filter: BoxFilter) -> Self {
        self.smoothing = Some(filter);
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn smoothing(&self) -> Option<BoxFilter> {
        self.smoothing
    }

    /// Scale and optionally smooth a series in place of the original
    pub fn apply(&self, mut series: AxisSeries) -> AxisSeries {
        for v in series.values.iter_mut() {
            *v *= self.scale;
        }
        if let Some(filter) = &self.smoothing {
            series.values = filter.apply(&series.values);
        }
        series
    }
}
