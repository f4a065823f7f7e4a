//! Row-Major Matrix View

use crate::{AxisSeries, MatrixError};
use std::iter::{Copied, StepBy};
use std::slice::Iter;

/// Iterator over one column of a [`SampleMatrix`]
pub type Column<'a> = Copied<StepBy<Iter<'a, f64>>>;

/// Borrowed row-major view over an interleaved sample buffer
///
/// A buffer `[x0, y0, z0, x1, y1, z1, ...]` with three columns has rows
/// `[x0, y0, z0]`, `[x1, y1, z1]` and column 0 `[x0, x1, ...]`.
#[derive(Debug, Clone, Copy)]
pub struct SampleMatrix<'a> {
    /// Flat storage, `rows * columns` long
    data: &'a [f64],
    /// Number of axes
    columns: usize,
    /// Number of timesteps
    rows: usize,
}

impl<'a> SampleMatrix<'a> {
    /// Wrap a flat buffer with the given number of columns
    pub fn new(data: &'a [f64], columns: usize) -> Result<Self, MatrixError> {
        if columns == 0 {
            return Err(MatrixError::NoColumns);
        }
        if data.len() % columns != 0 {
            return Err(MatrixError::RaggedBuffer {
                len: data.len(),
                columns,
            });
        }

        Ok(Self {
            data,
            columns,
            rows: data.len() / columns,
        })
    }

    /// Number of timesteps (window length)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of axes
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the sample at (row, column)
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(self.data[row * self.columns + column])
    }

    /// Get one timestep across all axes
    pub fn row(&self, row: usize) -> Option<&'a [f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.columns;
        Some(&self.data[start..start + self.columns])
    }

    /// Iterate one axis through time
    pub fn column(&self, column: usize) -> Option<Column<'a>> {
        if column >= self.columns {
            return None;
        }
        let tail = self.data.get(column..).unwrap_or(&[]);
        Some(tail.iter().step_by(self.columns).copied())
    }

    /// Split a flat buffer into one series per named axis
    ///
    /// The axis count is taken from `names`; series are returned in the same order.
    pub fn deinterleave<S: AsRef<str>>(
        data: &'a [f64],
        names: &[S],
    ) -> Result<Vec<AxisSeries>, MatrixError> {
        let matrix = Self::new(data, names.len())?;
        Ok(names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values = matrix
                    .column(idx)
                    .map(|c| c.collect())
                    .unwrap_or_default();
                AxisSeries::new(name.as_ref(), values)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rows_and_columns() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let matrix = SampleMatrix::new(&data, 2).unwrap();

        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.columns(), 2);
        assert_eq!(matrix.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(matrix.get(2, 0), Some(5.0));
        assert_eq!(matrix.get(3, 0), None);
        assert_eq!(matrix.get(0, 2), None);
    }

    #[test]
    fn test_column_reads_every_nth_sample() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let matrix = SampleMatrix::new(&data, 3).unwrap();

        let y: Vec<f64> = matrix.column(1).unwrap().collect();
        assert_eq!(y, vec![2.0, 5.0]);
        assert!(matrix.column(3).is_none());
    }

    #[test]
    fn test_deinterleave_two_axes() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let series = SampleMatrix::deinterleave(&data, &["x", "y"]).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "x");
        assert_eq!(series[0].values, vec![1.0, 3.0, 5.0]);
        assert_eq!(series[1].name, "y");
        assert_eq!(series[1].values, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_ragged_buffer_rejected() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let err = SampleMatrix::deinterleave(&data, &["x", "y"]).unwrap_err();
        assert_eq!(err, MatrixError::RaggedBuffer { len: 5, columns: 2 });
    }

    #[test]
    fn test_no_axes_rejected() {
        let names: [&str; 0] = [];
        let err = SampleMatrix::deinterleave(&[1.0], &names).unwrap_err();
        assert_eq!(err, MatrixError::NoColumns);
    }

    #[test]
    fn test_empty_buffer() {
        let series = SampleMatrix::deinterleave(&[], &["x", "y", "z"]).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|s| s.is_empty()));
    }

    proptest! {
        #[test]
        fn prop_deinterleave_preserves_samples(
            rows in 0usize..40,
            columns in 1usize..6,
            seed in -1000.0f64..1000.0,
        ) {
            let data: Vec<f64> = (0..rows * columns).map(|i| seed + i as f64).collect();
            let names: Vec<String> = (0..columns).map(|c| format!("a{c}")).collect();
            let series = SampleMatrix::deinterleave(&data, &names).unwrap();

            prop_assert_eq!(series.len(), columns);
            for (c, s) in series.iter().enumerate() {
                prop_assert_eq!(s.len(), rows);
                for (r, v) in s.values.iter().enumerate() {
                    prop_assert_eq!(*v, data[r * columns + c]);
                }
            }
        }
    }
}
