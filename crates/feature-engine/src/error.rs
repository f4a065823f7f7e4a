//! Feature Extraction Error Types

use sample_matrix::MatrixError;
use thiserror::Error;

/// Errors that abort a feature extraction run
#[derive(Debug, Error)]
pub enum DspError {
    /// Raw window cannot be split into the requested axes
    #[error("Shape error: {0}")]
    Shape(#[from] MatrixError),

    /// Diagnostic image could not be created or encoded
    #[error("Render error: {0}")]
    Render(String),

    /// A parameter is missing its expected type or range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl DspError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether the failure is caused by the caller's input
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Render(_))
    }
}

impl From<image::ImageError> for DspError {
    fn from(err: image::ImageError) -> Self {
        Self::Render(err.to_string())
    }
}
