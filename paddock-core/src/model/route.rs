use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use super::venue::{Edge, NodeId, WalkGraph};
use crate::{Celsius, Meters, routing::edge_cost};

/// Cost model used by the pathfinder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutePreference {
    /// Shortest walking distance, thermal data ignored
    #[default]
    Fastest,
    /// Prefer shaded and cool surfaces once it is hot enough
    Coolest,
}

/// Ordered sequence of edges from origin to target.
///
/// An empty route means no path exists; it is a normal outcome of a search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub edges: Vec<Edge>,
}

impl Route {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn origin(&self) -> Option<&str> {
        self.edges.first().map(|edge| edge.source.as_str())
    }

    pub fn target(&self) -> Option<&str> {
        self.edges.last().map(|edge| edge.destination.as_str())
    }

    pub fn total_distance_m(&self) -> Meters {
        self.edges.iter().map(|edge| f64::from(edge.distance_m)).sum()
    }

    pub fn total_cost(&self, preference: RoutePreference, ambient_temperature_c: Celsius) -> f64 {
        self.edges
            .iter()
            .map(|edge| edge_cost(edge, preference, ambient_temperature_c))
            .sum()
    }

    /// Node ids visited by the route, origin first
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.edges.len() + 1);
        if let Some(first) = self.edges.first() {
            ids.push(first.source.clone());
        }
        ids.extend(self.edges.iter().map(|edge| edge.destination.clone()));
        ids
    }

    /// Polyline through the route nodes; nodes missing from `graph` are skipped
    pub fn geometry(&self, graph: &WalkGraph) -> LineString<f64> {
        self.node_ids()
            .iter()
            .filter_map(|id| graph.node(id))
            .map(|node| Coord::from(node.geometry))
            .collect()
    }
}
