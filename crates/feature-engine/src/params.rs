//! Block Parameters
//!
//! Parameters arrive as a loosely typed JSON object keyed by the names published in
//! the block descriptor (`scale-axes`, `smooth`). Underscore spellings are accepted
//! as well, and numeric values may be sent as strings.

use crate::error::DspError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

/// Implementation version reported by the block descriptor
pub const LATEST_IMPLEMENTATION_VERSION: u32 = 1;

/// Typed block parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockParameters {
    /// Multiplies every sample
    pub scale_axes: f64,
    /// Apply the box smoothing pass
    pub smooth: bool,
}

impl Default for BlockParameters {
    fn default() -> Self {
        Self {
            scale_axes: 1.0,
            smooth: false,
        }
    }
}

impl BlockParameters {
    /// Parse parameters from a request's `params` object
    pub fn from_map(params: &Map<String, Value>) -> Result<Self, DspError> {
        let mut out = Self::default();

        for (key, value) in params {
            match key.replace('-', "_").as_str() {
                "scale_axes" => out.scale_axes = coerce_f64("scale-axes", value)?,
                "smooth" => out.smooth = coerce_bool("smooth", value)?,
                _ => warn!("Ignoring unknown parameter {:?}", key),
            }
        }

        Ok(out)
    }
}

fn coerce_f64(name: &'static str, value: &Value) -> Result<f64, DspError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DspError::invalid(name, format!("{n} is not representable"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| DspError::invalid(name, format!("{s:?} is not a number"))),
        other => Err(DspError::invalid(name, format!("expected a number, got {other}"))),
    }
}

fn coerce_bool(name: &'static str, value: &Value) -> Result<bool, DspError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(DspError::invalid(name, format!("{s:?} is not a boolean"))),
        },
        other => Err(DspError::invalid(name, format!("expected a boolean, got {other}"))),
    }
}

/// Descriptor for one configurable parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterItem {
    pub name: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub kind: String,
    pub help: String,
    pub param: String,
}

/// Named group of parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub group: String,
    pub items: Vec<ParameterItem>,
}

/// Block metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub title: String,
    pub author: String,
    pub description: String,
    pub name: String,
    pub prefer_convolution: bool,
    pub cpp_type: String,
    pub visualization: String,
    pub experimental: bool,
    pub latest_implementation_version: u32,
}

/// Published description of the block and its parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub info: BlockInfo,
    pub parameters: Vec<ParameterGroup>,
}

impl Default for BlockDescriptor {
    fn default() -> Self {
        let defaults = BlockParameters::default();
        Self {
            version: 1,
            kind: "dsp".to_string(),
            info: BlockInfo {
                title: "Smoothing & scaling".to_string(),
                author: "VehicallOS Team".to_string(),
                description: "Scales every axis and optionally applies a box smoothing filter."
                    .to_string(),
                name: "Smoothing".to_string(),
                prefer_convolution: false,
                cpp_type: "custom_block".to_string(),
                visualization: "dimensionalityReduction".to_string(),
                experimental: false,
                latest_implementation_version: LATEST_IMPLEMENTATION_VERSION,
            },
            parameters: vec![
                ParameterGroup {
                    group: "Scaling".to_string(),
                    items: vec![ParameterItem {
                        name: "Scale axes".to_string(),
                        value: json!(defaults.scale_axes),
                        kind: "float".to_string(),
                        help: "Multiplies axes by this number".to_string(),
                        param: "scale-axes".to_string(),
                    }],
                },
                ParameterGroup {
                    group: "Filter".to_string(),
                    items: vec![ParameterItem {
                        name: "Smooth".to_string(),
                        value: json!(defaults.smooth),
                        kind: "boolean".to_string(),
                        help: "Whether to apply a smoothing filter".to_string(),
                        param: "smooth".to_string(),
                    }],
                },
            ],
        }
    }
}
