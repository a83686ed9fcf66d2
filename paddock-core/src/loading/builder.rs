use geo::{Distance, Haversine};
use hashbrown::HashMap;
use log::{info, warn};
use petgraph::graph::{DiGraph, NodeIndex};

use super::raw_types::{RawEdge, RawNode, RawVenue};
use crate::model::{Edge, Node, NodeId, SurfaceType, WalkGraph};

/// Suffix appended to the id of the generated reverse edge of a two-way path
const REVERSE_SUFFIX: &str = ":rev";

/// Builder for walking graphs.
///
/// Collects nodes and edges in any order and validates them on [`build`]:
/// edges with unknown endpoints or unusable distances are skipped, shade
/// values are clamped to `[0, 1]`, and duplicate node ids keep the first
/// occurrence. An edge shorter than the straight line between its ends is
/// stretched to that line, so the search heuristic stays a lower bound. Building never fails; malformed records only shrink the graph.
///
/// [`build`]: VenueGraphBuilder::build
#[derive(Debug, Default, Clone)]
pub struct VenueGraphBuilder {
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
}

impl VenueGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(venue: RawVenue) -> Self {
        Self {
            nodes: venue.nodes,
            edges: venue.edges,
        }
    }

    pub fn add_node(mut self, id: impl Into<NodeId>, latitude: f64, longitude: f64) -> Self {
        self.nodes.push(RawNode {
            id: id.into(),
            lat: latitude,
            lon: longitude,
        });
        self
    }

    /// Adds a one-way edge
    pub fn add_edge(
        self,
        id: impl Into<String>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        distance_m: f32,
        surface: SurfaceType,
        shade_factor: f32,
    ) -> Self {
        self.push_edge(id, from, to, Some(distance_m), surface, shade_factor, false)
    }

    /// Adds a two-way path, stored as a pair of directed edges
    pub fn add_path(
        self,
        id: impl Into<String>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        distance_m: f32,
        surface: SurfaceType,
        shade_factor: f32,
    ) -> Self {
        self.push_edge(id, from, to, Some(distance_m), surface, shade_factor, true)
    }

    /// Adds a two-way path whose length is the straight-line distance between its ends
    pub fn add_straight_path(
        self,
        id: impl Into<String>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        surface: SurfaceType,
        shade_factor: f32,
    ) -> Self {
        self.push_edge(id, from, to, None, surface, shade_factor, true)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_edge(
        mut self,
        id: impl Into<String>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        distance_m: Option<f32>,
        surface: SurfaceType,
        shade: f32,
        bidirectional: bool,
    ) -> Self {
        self.edges.push(RawEdge {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            distance_m,
            surface,
            shade,
            bidirectional,
        });
        self
    }

    pub fn build(self) -> WalkGraph {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len() * 2);
        let mut lookup: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for raw in self.nodes {
            if !valid_coordinates(raw.lat, raw.lon) {
                warn!(
                    "Node {} has invalid coordinates ({}, {}) - skipping",
                    raw.id, raw.lat, raw.lon
                );
                continue;
            }
            if lookup.contains_key(&raw.id) {
                warn!("Duplicate node id {} - keeping the first occurrence", raw.id);
                continue;
            }
            let idx = graph.add_node(Node::new(raw.id.clone(), raw.lat, raw.lon));
            lookup.insert(raw.id, idx);
        }

        let mut skipped = 0usize;
        for raw in self.edges {
            let (Some(&source), Some(&target)) = (lookup.get(&raw.from), lookup.get(&raw.to))
            else {
                warn!(
                    "Edge {} references unknown node ({} -> {}) - skipping",
                    raw.id, raw.from, raw.to
                );
                skipped += 1;
                continue;
            };

            let straight_line = Haversine.distance(graph[source].geometry, graph[target].geometry);
            let distance_m = match raw.distance_m {
                Some(d) if d.is_finite() && d >= 0.0 => d,
                Some(d) => {
                    warn!("Edge {} has invalid distance {d} - skipping", raw.id);
                    skipped += 1;
                    continue;
                }
                #[allow(clippy::cast_possible_truncation)]
                None => straight_line as f32,
            };
            let distance_m = raise_to_straight_line(&raw.id, distance_m, straight_line);

            let shade_factor = clamp_shade(&raw.id, raw.shade);
            let edge = Edge::new(
                raw.id,
                raw.from,
                raw.to,
                distance_m,
                raw.surface,
                shade_factor,
            );

            if raw.bidirectional {
                let reverse = edge.reversed(format!("{}{REVERSE_SUFFIX}", edge.id));
                graph.add_edge(target, source, reverse);
            }
            graph.add_edge(source, target, edge);
        }

        info!(
            "Built walk graph with {} nodes and {} edges ({skipped} edges skipped)",
            graph.node_count(),
            graph.edge_count()
        );

        WalkGraph::from_parts(graph, lookup)
    }
}

/// Lengths below the straight line would let the A* heuristic overestimate
#[allow(clippy::cast_possible_truncation)]
fn raise_to_straight_line(edge_id: &str, distance_m: f32, straight_line: f64) -> f32 {
    if f64::from(distance_m) >= straight_line {
        return distance_m;
    }
    if f64::from(distance_m) + 0.5 < straight_line {
        warn!(
            "Edge {edge_id} is shorter ({distance_m:.1} m) than the straight line \
            between its ends ({straight_line:.1} m) - using the straight line"
        );
    }
    straight_line as f32
}

fn valid_coordinates(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

fn clamp_shade(edge_id: &str, shade: f32) -> f32 {
    if !shade.is_finite() {
        warn!("Edge {edge_id} has invalid shade {shade} - treating as full sun");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&shade) {
        warn!("Edge {edge_id} shade {shade} outside [0, 1] - clamping");
    }
    shade.clamp(0.0, 1.0)
}
