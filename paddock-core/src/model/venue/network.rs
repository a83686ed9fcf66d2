//! Walking graph with id lookup and spatial index

use geo::{Distance, Haversine, Point};
use hashbrown::HashMap;
use petgraph::{
    Directed,
    graph::{DiGraph, Edges, NodeIndex},
};
use rstar::{RTree, primitives::GeomWithData};

use super::components::{Edge, Node, NodeId};

/// Node position in the R-tree, `[longitude, latitude]` tagged with its graph index
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Candidates pulled from the R-tree before ranking by geodesic distance.
/// The tree works in raw degrees, which distorts east-west distances.
const NEAREST_CANDIDATES: usize = 8;

/// Directed walking network of a venue.
///
/// Built once by the loading module and read-only afterwards, so a single
/// instance can be shared between sessions behind an `Arc`.
#[derive(Debug, Clone)]
pub struct WalkGraph {
    pub graph: DiGraph<Node, Edge>,
    node_lookup: HashMap<NodeId, NodeIndex>,
    rtree: RTree<IndexedPoint>,
}

impl WalkGraph {
    pub(crate) fn from_parts(
        graph: DiGraph<Node, Edge>,
        node_lookup: HashMap<NodeId, NodeIndex>,
    ) -> Self {
        let points = graph
            .node_indices()
            .map(|idx| {
                let geometry = graph[idx].geometry;
                IndexedPoint::new([geometry.x(), geometry.y()], idx)
            })
            .collect();

        Self {
            graph,
            node_lookup,
            rtree: RTree::bulk_load(points),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_lookup.contains_key(id)
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_lookup.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn node_at(&self, idx: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(idx)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Outgoing edges of the node at `node`
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, Edge, Directed> {
        self.graph.edges(node)
    }

    /// Outgoing edges of the node with the given id, empty for unknown ids
    pub fn outgoing<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.node_index(id)
            .into_iter()
            .flat_map(move |idx| self.graph.edges(idx).map(|edge| edge.weight()))
    }

    /// Finds the closest node to `point`, returning its index and the
    /// geodesic distance to it in meters
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        self.rtree
            .nearest_neighbor_iter(&[point.x(), point.y()])
            .take(NEAREST_CANDIDATES)
            .map(|candidate| {
                let [lon, lat] = *candidate.geom();
                (
                    candidate.data,
                    Haversine.distance(*point, Point::new(lon, lat)),
                )
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use crate::loading::VenueGraphBuilder;
    use crate::model::SurfaceType;
    use geo::Point;

    fn triangle() -> crate::WalkGraph {
        VenueGraphBuilder::new()
            .add_node("a", 52.0700, -1.0150)
            .add_node("b", 52.0710, -1.0150)
            .add_node("c", 52.0710, -1.0130)
            .add_edge("ab", "a", "b", 111.0, SurfaceType::Asphalt, 0.0)
            .add_edge("ac", "a", "c", 180.0, SurfaceType::Grass, 1.0)
            .add_edge("bc", "b", "c", 140.0, SurfaceType::Gravel, 0.5)
            .build()
    }

    #[test]
    fn outgoing_edges_follow_direction() {
        let graph = triangle();
        let mut out: Vec<_> = graph.outgoing("a").map(|e| e.id.as_str()).collect();
        out.sort_unstable();
        assert_eq!(out, vec!["ab", "ac"]);
        assert_eq!(graph.outgoing("c").count(), 0);
        assert_eq!(graph.outgoing("missing").count(), 0);
    }

    #[test]
    fn nearest_node_picks_closest_point() {
        let graph = triangle();
        let (idx, distance) = graph
            .nearest_node(&Point::new(-1.0131, 52.0709))
            .expect("graph is not empty");
        assert_eq!(graph.node_at(idx).map(|n| n.id.as_str()), Some("c"));
        assert!(distance < 20.0);
    }

    #[test]
    fn nearest_node_on_empty_graph_is_none() {
        let graph = VenueGraphBuilder::new().build();
        assert!(graph.nearest_node(&Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn lookup_by_id() {
        let graph = triangle();
        assert!(graph.contains_node("b"));
        assert!(!graph.contains_node("z"));
        assert_eq!(graph.node("b").map(|n| n.latitude()), Some(52.0710));
    }
}
