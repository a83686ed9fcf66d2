//! A* search over the walking graph.
//!
//! The heuristic is the Haversine distance to the target. Every cost model
//! charges at least the raw edge distance, and edge distances are never
//! shorter than the straight line between their ends, so the heuristic never
//! overestimates and a closed node never has to be reopened.

mod state;

use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use geo::{Distance, Haversine, Point};
use log::debug;
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use self::state::State;
use super::cost::edge_cost;
use crate::{
    Celsius, Error,
    model::{Edge, Node, Route, RoutePreference, WalkGraph},
};

/// Finds the cheapest route between two nodes under `preference`.
///
/// The function is total: unknown node ids and disconnected nodes both
/// yield an empty route. Use [`route_between`] to tell the two apart.
pub fn find_route(
    graph: &WalkGraph,
    start_id: &str,
    target_id: &str,
    preference: RoutePreference,
    ambient_temperature_c: Celsius,
) -> Route {
    let (Some(start), Some(target)) = (graph.node_index(start_id), graph.node_index(target_id))
    else {
        debug!("Route request for unknown node ({start_id} -> {target_id})");
        return Route::empty();
    };

    match astar(graph, start, target, preference, ambient_temperature_c) {
        Some(edges) => Route::new(edges),
        None => {
            debug!("No path between {start_id} and {target_id}");
            Route::empty()
        }
    }
}

/// Like [`find_route`], but reports unknown node ids as errors
///
/// # Errors
///
/// Returns [`Error::UnknownNode`] if either id is not part of the graph
pub fn route_between(
    graph: &WalkGraph,
    start_id: &str,
    target_id: &str,
    preference: RoutePreference,
    ambient_temperature_c: Celsius,
) -> Result<Route, Error> {
    for id in [start_id, target_id] {
        if !graph.contains_node(id) {
            return Err(Error::UnknownNode(id.to_string()));
        }
    }
    Ok(find_route(
        graph,
        start_id,
        target_id,
        preference,
        ambient_temperature_c,
    ))
}

/// Straight-line distance in meters between two nodes
pub fn heuristic(from: &Node, to: &Node) -> f64 {
    Haversine.distance(from.geometry, to.geometry)
}

fn astar(
    graph: &WalkGraph,
    start: NodeIndex,
    target: NodeIndex,
    preference: RoutePreference,
    ambient_temperature_c: Celsius,
) -> Option<Vec<Edge>> {
    if start == target {
        return None;
    }

    let n = graph.node_count();
    let target_point = graph.graph[target].geometry;
    let estimate = |node: NodeIndex| -> f64 { distance_to(graph, node, target_point) };

    // g_score[node] = cost of the cheapest known path from start to node
    let mut g_score = vec![f64::MAX; n];
    // came_from[node] = edge used to reach node on that path
    let mut came_from: Vec<Option<EdgeIndex>> = vec![None; n];
    let mut closed = FixedBitSet::with_capacity(n);
    let mut open = BinaryHeap::with_capacity(n.min(1000) / 4 + 1);

    g_score[start.index()] = 0.0;
    open.push(State {
        f_score: estimate(start),
        node: start,
    });

    while let Some(State { node, .. }) = open.pop() {
        if node == target {
            return Some(reconstruct_path(graph, &came_from, start, target));
        }

        if closed.contains(node.index()) {
            continue;
        }
        closed.insert(node.index());

        let current_g = g_score[node.index()];

        for edge in graph.edges(node) {
            let next = edge.target();
            if closed.contains(next.index()) {
                continue;
            }

            let tentative_g = current_g + edge_cost(edge.weight(), preference, ambient_temperature_c);
            if tentative_g < g_score[next.index()] {
                g_score[next.index()] = tentative_g;
                came_from[next.index()] = Some(edge.id());
                open.push(State {
                    f_score: tentative_g + estimate(next),
                    node: next,
                });
            }
        }
    }

    None
}

fn distance_to(graph: &WalkGraph, node: NodeIndex, target: Point<f64>) -> f64 {
    Haversine.distance(graph.graph[node].geometry, target)
}

/// Follows came-from edges backwards from target and returns them start first
fn reconstruct_path(
    graph: &WalkGraph,
    came_from: &[Option<EdgeIndex>],
    start: NodeIndex,
    target: NodeIndex,
) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut current = target;

    // Each node is entered through at most one edge, so the walk is bounded
    for _ in 0..came_from.len() {
        if current == start {
            break;
        }
        let Some(edge_idx) = came_from[current.index()] else {
            break;
        };
        let Some((source, _)) = graph.graph.edge_endpoints(edge_idx) else {
            break;
        };
        edges.push(graph.graph[edge_idx].clone());
        current = source;
    }

    edges.reverse();
    edges
}
