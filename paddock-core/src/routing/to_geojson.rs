use geojson::{Feature, Geometry, GeometryValue};
use serde_json::json;

use crate::{
    Error,
    model::{Route, WalkGraph, WalkingRoute},
};

impl Route {
    /// Converts the route to a `GeoJSON` `Feature` with a `LineString` geometry
    pub fn to_geojson(&self, graph: &WalkGraph) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeometryValue::from(&self.geometry(graph)));
        let distance_m = self.total_distance_m();
        let shaded_m: f64 = self
            .edges
            .iter()
            .map(|edge| f64::from(edge.distance_m) * f64::from(edge.shade_factor))
            .sum();

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "edges": self.edges.iter().map(|edge| edge.id.as_str()).collect::<Vec<_>>(),
                "nodes": self.node_ids(),
                "distance_m": distance_m,
                "shaded_m": shaded_m,
            }
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

impl WalkingRoute {
    /// Converts the route to a `GeoJSON` `Feature` with step instructions as properties
    pub fn to_geojson(&self) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeometryValue::from(&self.geometry()));
        let steps: Vec<_> = self
            .steps
            .iter()
            .map(|step| {
                json!({
                    "instruction": step.instruction(),
                    "point_index": step.point_index,
                    "distance_m": step.distance_m,
                })
            })
            .collect();

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "distance_m": self.distance_m,
                "duration_s": self.duration_s,
                "steps": steps,
            }
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}
