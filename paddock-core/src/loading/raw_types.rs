//! Serialized venue graph records, as exported by the venue admin tooling

use serde::Deserialize;

use crate::model::SurfaceType;

#[derive(Debug, Clone, Deserialize)]
pub struct RawVenue {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    /// Derived from the endpoint coordinates when absent
    #[serde(default)]
    pub distance_m: Option<f32>,
    #[serde(default = "default_surface")]
    pub surface: SurfaceType,
    #[serde(default)]
    pub shade: f32,
    #[serde(default)]
    pub bidirectional: bool,
}

fn default_surface() -> SurfaceType {
    SurfaceType::Asphalt
}
