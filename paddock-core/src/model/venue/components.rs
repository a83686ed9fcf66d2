//! Walking network components - nodes, edges and surfaces

use geo::Point;
use serde::{Deserialize, Serialize};

/// Identifier of a node as it appears in the venue data
pub type NodeId = String;

/// Walking graph node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Node coordinates (x = longitude, y = latitude)
    pub geometry: Point<f64>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            geometry: Point::new(longitude, latitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.geometry.y()
    }

    pub fn longitude(&self) -> f64 {
        self.geometry.x()
    }
}

/// Ground cover of a path segment.
///
/// Each surface radiates heat differently; the multiplier scales the sun
/// exposure penalty applied by the heat-avoiding cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceType {
    Asphalt,
    Concrete,
    Gravel,
    Grass,
}

impl SurfaceType {
    pub const fn thermal_multiplier(self) -> f64 {
        match self {
            SurfaceType::Asphalt => 1.5,
            SurfaceType::Concrete => 1.2,
            SurfaceType::Gravel => 0.9,
            SurfaceType::Grass => 0.5,
        }
    }
}

/// Directed walking graph edge (path segment)
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub destination: NodeId,
    /// Walking length in meters
    pub distance_m: f32,
    pub surface: SurfaceType,
    /// Shaded fraction of the segment, 0 is full sun and 1 is fully shaded
    pub shade_factor: f32,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<NodeId>,
        destination: impl Into<NodeId>,
        distance_m: f32,
        surface: SurfaceType,
        shade_factor: f32,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            destination: destination.into(),
            distance_m,
            surface,
            shade_factor,
        }
    }

    /// Same segment walked in the opposite direction
    pub fn reversed(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: self.destination.clone(),
            destination: self.source.clone(),
            ..self.clone()
        }
    }
}
