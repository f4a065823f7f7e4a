//! Feature Vector Assembly

use crate::error::DspError;
use crate::graph::{AxisMap, GraphBuilder, GraphOptions, GraphPayload};
use crate::params::{BlockParameters, LATEST_IMPLEMENTATION_VERSION};
use crate::render::{ImageOptions, ImageRenderer, PngRasterizer, Rasterizer};
use crate::smoothing::{BoxFilter, DEFAULT_BOX_POINTS};
use crate::transform::AxisTransform;
use sample_matrix::SampleMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One window of raw samples and the settings to process it with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRequest {
    /// Informational only
    pub implementation_version: u32,
    /// Build the line graph and image payloads
    pub draw_graphs: bool,
    /// Interleaved samples, one row per timestep
    pub raw_data: Vec<f64>,
    /// Axis names, in column order
    pub axes: Vec<String>,
    /// Sampling frequency (Hz), used for the graph time axis
    pub sampling_freq: f64,
    /// Multiplicative factor for every sample
    pub scale_axes: f64,
    /// Apply the box smoothing pass
    pub smooth: bool,
}

impl FeatureRequest {
    /// Request with unit scale, no smoothing and no graphs
    pub fn new(raw_data: Vec<f64>, axes: Vec<String>, sampling_freq: f64) -> Self {
        Self {
            implementation_version: LATEST_IMPLEMENTATION_VERSION,
            draw_graphs: false,
            raw_data,
            axes,
            sampling_freq,
            scale_axes: 1.0,
            smooth: false,
        }
    }

    pub fn with_params(mut self, params: BlockParameters) -> Self {
        self.scale_axes = params.scale_axes;
        self.smooth = params.smooth;
        self
    }

    pub fn with_graphs(mut self, draw_graphs: bool) -> Self {
        self.draw_graphs = draw_graphs;
        self
    }
}

/// Logical shape of the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShape {
    pub width: usize,
}

/// Layout descriptor for downstream consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    Flat { shape: OutputShape },
}

impl OutputConfig {
    pub fn flat(width: usize) -> Self {
        Self::Flat {
            shape: OutputShape { width },
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Self::Flat { shape } => shape.width,
        }
    }
}

/// Result of one feature extraction run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureOutput {
    /// All axes' transformed samples, axis after axis
    pub features: Vec<f64>,
    /// Line graph then image, only when graphs were requested
    pub graphs: Vec<GraphPayload>,
    pub output_config: OutputConfig,
}

impl FeatureOutput {
    /// Package features and graphs; the width is the feature count
    pub fn assemble(features: Vec<f64>, graphs: Vec<GraphPayload>) -> Self {
        let output_config = OutputConfig::flat(features.len());
        Self {
            features,
            graphs,
            output_config,
        }
    }
}

/// Tunables for the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureOptions {
    /// Box filter width used when smoothing is enabled
    pub box_pts: usize,
    pub graph: GraphOptions,
    pub image: ImageOptions,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            box_pts: DEFAULT_BOX_POINTS,
            graph: GraphOptions::default(),
            image: ImageOptions::default(),
        }
    }
}

/// Feature extractor turning raw windows into feature vectors and graphs
#[derive(Debug, Clone)]
pub struct FeatureExtractor<R = PngRasterizer> {
    filter: BoxFilter,
    graphs: GraphBuilder,
    renderer: ImageRenderer<R>,
}

impl FeatureExtractor<PngRasterizer> {
    /// Extractor with the PNG backend and no caption font
    pub fn new(options: FeatureOptions) -> Result<Self, DspError> {
        Self::with_rasterizer(options, PngRasterizer::new())
    }
}

impl<R: Rasterizer> FeatureExtractor<R> {
    /// Extractor drawing images through a custom backend
    pub fn with_rasterizer(options: FeatureOptions, rasterizer: R) -> Result<Self, DspError> {
        Ok(Self {
            filter: BoxFilter::new(options.box_pts)?,
            graphs: GraphBuilder::new(options.graph),
            renderer: ImageRenderer::new(rasterizer, options.image),
        })
    }

    /// Run the whole pipeline for one window
    ///
    /// Either every stage succeeds or an error is returned; no partial output.
    pub fn generate(&self, request: &FeatureRequest) -> Result<FeatureOutput, DspError> {
        let axes = SampleMatrix::deinterleave(&request.raw_data, &request.axes)?;
        let window_length = axes.first().map(|s| s.len()).unwrap_or(0);

        debug!(
            "Extracting features: axes={}, window={}, scale={}, smooth={}, graphs={}",
            axes.len(),
            window_length,
            request.scale_axes,
            request.smooth,
            request.draw_graphs
        );

        let mut transform = AxisTransform::new(request.scale_axes);
        if request.smooth {
            transform = transform.with_smoothing(self.filter);
        }

        let mut features = Vec::with_capacity(request.raw_data.len());
        let mut smoothed = AxisMap::new();
        for series in axes {
            let series = transform.apply(series);
            features.extend_from_slice(&series.values);
            if request.draw_graphs {
                smoothed.insert(series.name, series.values);
            }
        }

        let mut graphs = Vec::new();
        if request.draw_graphs {
            let line = self
                .graphs
                .build(smoothed, window_length, request.sampling_freq)?;
            graphs.push(GraphPayload::Line(line));
            graphs.push(GraphPayload::Image(self.renderer.render()?));
        }

        Ok(FeatureOutput::assemble(features, graphs))
    }
}

/// Run the pipeline with default options and the PNG backend
pub fn generate_features(request: &FeatureRequest) -> Result<FeatureOutput, DspError> {
    FeatureExtractor::new(FeatureOptions::default())?.generate(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::BrokenEncoder;
    use base64::{engine::general_purpose, Engine as _};
    use proptest::prelude::*;
    use sample_matrix::MatrixError;

    fn axes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scaled_features_are_axis_major() {
        let raw = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let request = FeatureRequest::new(raw, axes(&["x", "y"]), 100.0)
            .with_params(BlockParameters {
                scale_axes: 2.0,
                smooth: false,
            });
        let output = generate_features(&request).unwrap();

        assert_eq!(output.features, vec![2.0, 6.0, 10.0, 4.0, 8.0, 12.0]);
        assert!(output.graphs.is_empty());
        assert_eq!(output.output_config, OutputConfig::flat(6));
    }

    #[test]
    fn test_ragged_window_is_shape_error() {
        let raw = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let request = FeatureRequest::new(raw, axes(&["x", "y"]), 100.0).with_graphs(true);
        let err = generate_features(&request).unwrap_err();
        assert!(matches!(
            err,
            DspError::Shape(MatrixError::RaggedBuffer { len: 5, columns: 2 })
        ));
    }

    #[test]
    fn test_smoothing_applied_per_axis() {
        // Two axes of five samples: x constant 1, y constant 2
        let raw: Vec<f64> = (0..5).flat_map(|_| [1.0, 2.0]).collect();
        let request = FeatureRequest::new(raw, axes(&["x", "y"]), 50.0)
            .with_params(BlockParameters {
                scale_axes: 1.0,
                smooth: true,
            });
        let output = generate_features(&request).unwrap();

        let expected = [0.6, 0.8, 1.0, 0.8, 0.6, 1.2, 1.6, 2.0, 1.6, 1.2];
        assert_eq!(output.features.len(), expected.len());
        for (a, e) in output.features.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9);
        }
    }

    #[test]
    fn test_graphs_drawn_when_requested() {
        let raw: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let request = FeatureRequest::new(raw, axes(&["accX", "accY", "accZ"]), 100.0)
            .with_params(BlockParameters {
                scale_axes: 1.0,
                smooth: true,
            })
            .with_graphs(true);
        let output = generate_features(&request).unwrap();

        assert_eq!(output.graphs.len(), 2);
        let GraphPayload::Line(line) = &output.graphs[0] else {
            panic!("first graph should be the line graph");
        };
        assert_eq!(line.name, "Smoothed");
        assert_eq!(line.series.keys().collect::<Vec<_>>(), vec!["accX", "accY", "accZ"]);
        assert_eq!(line.series.get("accY").unwrap(), &output.features[10..20]);
        assert_eq!(line.time_axis.len(), 11);
        assert!((line.time_axis[10] - 100.0).abs() < 1e-9);

        let GraphPayload::Image(image) = &output.graphs[1] else {
            panic!("second graph should be the image");
        };
        let bytes = general_purpose::STANDARD.decode(&image.image).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
    }

    #[test]
    fn test_default_image_carries_caption() {
        let request = FeatureRequest::new(vec![1.0, 2.0], axes(&["x"]), 10.0).with_graphs(true);
        let output = generate_features(&request).unwrap();
        let GraphPayload::Image(graph) = &output.graphs[1] else {
            panic!("second graph should be the image");
        };
        let bytes = general_purpose::STANDARD.decode(&graph.image).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();

        let white = image::Rgb([255u8, 255, 255]);
        let caption_pixels = (10..18)
            .flat_map(|y| (10..106).map(move |x| (x, y)))
            .filter(|&(x, y)| decoded.get_pixel(x, y) == &white)
            .count();
        assert!(caption_pixels > 0, "caption was not drawn");
    }

    #[test]
    fn test_render_failure_aborts_run() {
        let extractor =
            FeatureExtractor::with_rasterizer(FeatureOptions::default(), BrokenEncoder).unwrap();
        let request = FeatureRequest::new(vec![1.0, 2.0], axes(&["x"]), 10.0).with_graphs(true);
        assert!(matches!(
            extractor.generate(&request),
            Err(DspError::Render(_))
        ));

        // Without graphs the renderer is never touched
        let output = extractor.generate(&request.with_graphs(false)).unwrap();
        assert_eq!(output.features, vec![1.0, 2.0]);
    }

    #[test]
    fn test_bad_sampling_freq_only_matters_for_graphs() {
        let request = FeatureRequest::new(vec![1.0, 2.0], axes(&["x"]), 0.0);
        assert!(generate_features(&request).is_ok());
        assert!(matches!(
            generate_features(&request.with_graphs(true)),
            Err(DspError::InvalidParameter { name: "sampling_freq", .. })
        ));
    }

    #[test]
    fn test_output_json_layout() {
        let request = FeatureRequest::new(vec![0.5, 1.5], axes(&["x", "y"]), 10.0);
        let json = serde_json::to_value(generate_features(&request).unwrap()).unwrap();

        assert_eq!(json["features"], serde_json::json!([0.5, 1.5]));
        assert_eq!(json["graphs"], serde_json::json!([]));
        assert_eq!(
            json["output_config"],
            serde_json::json!({"type": "flat", "shape": {"width": 2}})
        );
    }

    #[test]
    fn test_zero_box_pts_rejected() {
        let options = FeatureOptions {
            box_pts: 0,
            ..Default::default()
        };
        assert!(FeatureExtractor::new(options).is_err());
    }

    proptest! {
        #[test]
        fn prop_feature_count_matches_input(
            rows in 0usize..64,
            columns in 1usize..5,
            scale in -10.0f64..10.0,
            smooth in any::<bool>(),
        ) {
            let raw: Vec<f64> = (0..rows * columns).map(|i| (i as f64).sin()).collect();
            let names: Vec<String> = (0..columns).map(|c| format!("ax{c}")).collect();
            let request = FeatureRequest::new(raw, names, 62.5).with_params(BlockParameters {
                scale_axes: scale,
                smooth,
            });
            let output = generate_features(&request).unwrap();

            prop_assert_eq!(output.features.len(), rows * columns);
            prop_assert_eq!(output.output_config.width(), rows * columns);
            prop_assert!(output.graphs.is_empty());
        }
    }
}
