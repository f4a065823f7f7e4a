//! Box Filter for Signal Smoothing

use crate::error::DspError;

/// Window size used by the smoothing stage
pub const DEFAULT_BOX_POINTS: usize = 5;

/// Uniform moving-average kernel applied as a "same"-length convolution
///
/// Output sample `i` averages the inputs from `i - box_pts / 2` through
/// `i - box_pts / 2 + box_pts - 1`. Positions outside the series count as
/// zero, so the edges are pulled towards zero instead of being renormalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFilter {
    box_pts: usize,
    weight: f64,
}

impl BoxFilter {
    /// Create a box filter with `box_pts` taps
    pub fn new(box_pts: usize) -> Result<Self, DspError> {
        if box_pts == 0 {
            return Err(DspError::invalid("box_pts", "window size must be > 0"));
        }
        Ok(Self {
            box_pts,
            weight: 1.0 / box_pts as f64,
        })
    }

    /// Number of taps in the kernel
    pub fn box_pts(&self) -> usize {
        self.box_pts
    }

    /// Smooth a series, returning a new series of the same length
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len() as isize;
        let lead = (self.box_pts / 2) as isize;

        (0..n)
            .map(|i| {
                let start = (i - lead).max(0);
                let end = (i - lead + self.box_pts as isize).min(n);
                (start..end)
                    .map(|k| values[k as usize] * self.weight)
                    .sum::<f64>()
            })
            .collect()
    }
}

impl Default for BoxFilter {
    fn default() -> Self {
        Self {
            box_pts: DEFAULT_BOX_POINTS,
            weight: 1.0 / DEFAULT_BOX_POINTS as f64,
        }
    }
}
