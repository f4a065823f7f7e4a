//! Feature Engineering Engine
//!
//! Turns an interleaved multi-axis sensor window into a flat feature vector,
//! with optional diagnostic graphs for inspecting the signal.
//!
//! Pipeline: de-interleave → scale → (box smoothing) → flatten, plus a
//! smoothed line graph and a rendered PNG when graphs are requested.

mod error;
mod features;
mod graph;
mod params;
mod render;
mod smoothing;
mod transform;

pub use error::DspError;
pub use features::{
    generate_features, FeatureExtractor, FeatureOptions, FeatureOutput, FeatureRequest,
    OutputConfig, OutputShape,
};
pub use graph::{
    time_axis, AxisMap, GraphBuilder, GraphOptions, GraphPayload, ImageGraph, ImageKind,
    LineGraph,
};
pub use params::{
    BlockDescriptor, BlockInfo, BlockParameters, ParameterGroup, ParameterItem,
    LATEST_IMPLEMENTATION_VERSION,
};
pub use render::{
    Caption, Color, EncodedImage, ImageOptions, ImageRenderer, PngRasterizer, Rasterizer,
};
pub use smoothing::{BoxFilter, DEFAULT_BOX_POINTS};
pub use transform::AxisTransform;

pub use sample_matrix::{AxisSeries, MatrixError, SampleMatrix};
