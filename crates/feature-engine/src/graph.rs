//! Diagnostic Graph Payloads

use crate::error::DspError;
use sample_matrix::AxisSeries;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// Line graph settings
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct GraphOptions {
    /// Display name of the line graph
    pub name: String,
    /// Rendering hint for the lower value bound
    pub suggested_min: f64,
    /// Rendering hint for the upper value bound
    pub suggested_max: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            name: "Smoothed".to_string(),
            suggested_min: -20.0,
            suggested_max: 20.0,
        }
    }
}

/// Axis name to series mapping that keeps the order axes were inserted in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisMap {
    entries: Vec<(String, Vec<f64>)>,
}

impl AxisMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series; a repeated axis name replaces the earlier values in place
    pub fn insert(&mut self, name: String, values: Vec<f64>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = values,
            None => self.entries.push((name, values)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AxisMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

impl FromIterator<AxisSeries> for AxisMap {
    fn from_iter<I: IntoIterator<Item = AxisSeries>>(iter: I) -> Self {
        let mut map = Self::new();
        for series in iter {
            map.insert(series.name, series.values);
        }
        map
    }
}

/// Smoothed signal over the window's time axis
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LineGraph {
    pub name: String,
    #[serde(rename = "X")]
    pub series: AxisMap,
    #[serde(rename = "y")]
    pub time_axis: Vec<f64>,
    #[serde(rename = "suggestedYMin")]
    pub suggested_min: f64,
    #[serde(rename = "suggestedYMax")]
    pub suggested_max: f64,
}

/// Rendered raster image, base64 encoded
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImageGraph {
    pub name: String,
    pub image: String,
    #[serde(rename = "imageMimeType")]
    pub mime_type: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
}

/// Type tag carried by image payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Image,
}

/// One diagnostic entry in a feature run's output
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum GraphPayload {
    Line(LineGraph),
    Image(ImageGraph),
}

impl GraphPayload {
    pub fn name(&self) -> &str {
        match self {
            Self::Line(g) => &g.name,
            Self::Image(g) => &g.name,
        }
    }
}

/// Evenly spaced timestamps (ms) for a window, `window_length + 1` points
///
/// Spans `[0, window_length * (1 / sampling_freq) * 1000]` inclusive, with the
/// last point pinned to the end value.
pub fn time_axis(window_length: usize, sampling_freq: f64) -> Result<Vec<f64>, DspError> {
    if !(sampling_freq.is_finite() && sampling_freq > 0.0) {
        return Err(DspError::invalid(
            "sampling_freq",
            format!("must be a positive number, got {sampling_freq}"),
        ));
    }

    let stop = window_length as f64 * (1.0 / sampling_freq) * 1000.0;
    if window_length == 0 {
        return Ok(vec![0.0]);
    }

    let step = stop / window_length as f64;
    let mut axis: Vec<f64> = (0..=window_length).map(|i| i as f64 * step).collect();
    axis[window_length] = stop;
    Ok(axis)
}

/// Builds the smoothed-signal line graph
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    options: GraphOptions,
}

impl GraphBuilder {
    pub fn new(options: GraphOptions) -> Self {
        Self { options }
    }

    pub fn build(
        &self,
        series: AxisMap,
        window_length: usize,
        sampling_freq: f64,
    ) -> Result<LineGraph, DspError> {
        Ok(LineGraph {
            name: self.options.name.clone(),
            series,
            time_axis: time_axis(window_length, sampling_freq)?,
            suggested_min: self.options.suggested_min,
            suggested_max: self.options.suggested_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_time_axis_has_extra_point() {
        let axis = time_axis(4, 100.0).unwrap();
        assert_eq!(axis.len(), 5);
        let expected = [0.0, 10.0, 20.0, 30.0, 40.0];
        for (a, e) in axis.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9);
        }
    }

    #[test]
    fn test_time_axis_empty_window() {
        assert_eq!(time_axis(0, 62.5).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_time_axis_rejects_bad_frequency() {
        assert!(time_axis(10, 0.0).is_err());
        assert!(time_axis(10, -5.0).is_err());
        assert!(time_axis(10, f64::NAN).is_err());
    }

    #[test]
    fn test_axis_map_keeps_insert_order() {
        let mut map = AxisMap::new();
        map.insert("z".into(), vec![1.0]);
        map.insert("a".into(), vec![2.0]);
        map.insert("z".into(), vec![3.0]);

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(map.get("z"), Some(&[3.0][..]));
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"z":[3.0],"a":[2.0]}"#
        );
    }

    #[test]
    fn test_line_graph_wire_names() {
        let builder = GraphBuilder::default();
        let series = vec![AxisSeries::new("accX", vec![0.5, 1.5])]
            .into_iter()
            .collect();
        let graph = builder.build(series, 2, 1000.0).unwrap();
        let json = serde_json::to_value(GraphPayload::Line(graph)).unwrap();

        assert_eq!(json["name"], "Smoothed");
        assert_eq!(json["X"]["accX"][1], 1.5);
        assert_eq!(json["y"].as_array().unwrap().len(), 3);
        assert_eq!(json["suggestedYMin"], -20.0);
        assert_eq!(json["suggestedYMax"], 20.0);
    }

    #[test]
    fn test_image_graph_type_tag() {
        let graph = GraphPayload::Image(ImageGraph {
            name: "img".into(),
            image: "AAAA".into(),
            mime_type: "image/png".into(),
            kind: ImageKind::Image,
        });
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["imageMimeType"], "image/png");
        assert_eq!(graph.name(), "img");
    }

    proptest! {
        #[test]
        fn prop_time_axis_shape(window in 0usize..500, freq in 0.5f64..10_000.0) {
            let axis = time_axis(window, freq).unwrap();
            prop_assert_eq!(axis.len(), window + 1);
            prop_assert_eq!(axis[0], 0.0);
            let stop = window as f64 * (1.0 / freq) * 1000.0;
            prop_assert_eq!(*axis.last().unwrap(), stop);
            prop_assert!(axis.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
