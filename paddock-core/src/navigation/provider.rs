use std::{
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};

use geo::Point;
use log::{debug, info, warn};

use crate::{
    Celsius, RoutingConfig,
    model::{RoutePreference, WalkGraph, WalkingRoute},
    routing::find_route,
};

/// Source of walking routes for a navigation session.
///
/// Returns `None` when no route can be produced, whether because the
/// destination is unreachable or because a backing service failed.
/// Transport errors must be mapped to `None`, never surfaced as panics.
pub trait RouteProvider: Send + Sync {
    fn get_route(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        avoid_congestion: bool,
    ) -> impl Future<Output = Option<WalkingRoute>> + Send;
}

impl<P: RouteProvider> RouteProvider for Arc<P> {
    fn get_route(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        avoid_congestion: bool,
    ) -> impl Future<Output = Option<WalkingRoute>> + Send {
        (**self).get_route(origin, destination, avoid_congestion)
    }
}

/// Route provider backed by the venue walking graph.
///
/// Origin and destination are snapped to their nearest graph nodes and the
/// A* search runs on a blocking worker thread. Routing conditions (cost
/// preference, ambient temperature) can be changed while sessions are
/// running; each request uses the values current when it starts.
#[derive(Debug)]
pub struct GraphRouteProvider {
    graph: Arc<WalkGraph>,
    conditions: RwLock<RoutingConfig>,
}

impl GraphRouteProvider {
    pub fn new(graph: Arc<WalkGraph>, config: RoutingConfig) -> Self {
        Self {
            graph,
            conditions: RwLock::new(config),
        }
    }

    pub fn graph(&self) -> &Arc<WalkGraph> {
        &self.graph
    }

    /// Snapshot of the current routing conditions
    pub fn conditions(&self) -> RoutingConfig {
        self.conditions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_ambient_temperature(&self, ambient_temperature_c: Celsius) {
        self.conditions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .ambient_temperature_c = ambient_temperature_c;
    }

    pub fn set_preference(&self, preference: RoutePreference) {
        self.conditions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .preference = preference;
    }

    /// Computes a route on the calling thread
    pub fn route_now(&self, origin: Point<f64>, destination: Point<f64>) -> Option<WalkingRoute> {
        compute_route(&self.graph, &self.conditions(), origin, destination)
    }
}

impl RouteProvider for GraphRouteProvider {
    async fn get_route(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        avoid_congestion: bool,
    ) -> Option<WalkingRoute> {
        if avoid_congestion {
            debug!("No congestion data for local routing - using current conditions only");
        }

        let graph = Arc::clone(&self.graph);
        let conditions = self.conditions();
        let task = tokio::task::spawn_blocking(move || {
            compute_route(&graph, &conditions, origin, destination)
        });

        match task.await {
            Ok(route) => route,
            Err(e) => {
                warn!("Route computation task failed: {e}");
                None
            }
        }
    }
}

fn compute_route(
    graph: &WalkGraph,
    conditions: &RoutingConfig,
    origin: Point<f64>,
    destination: Point<f64>,
) -> Option<WalkingRoute> {
    let (start, start_gap) = graph.nearest_node(&origin)?;
    let (target, target_gap) = graph.nearest_node(&destination)?;

    let max_gap = conditions.max_snap_distance_m;
    if start_gap > max_gap || target_gap > max_gap {
        info!(
            "Origin or destination too far from the path network \
            ({start_gap:.0} m / {target_gap:.0} m, max {max_gap:.0} m)"
        );
        return None;
    }

    if start == target {
        return Some(WalkingRoute::direct(
            origin,
            destination,
            conditions.walking_speed_mps,
        ));
    }

    let start_id = &graph.graph[start].id;
    let target_id = &graph.graph[target].id;
    let path = find_route(
        graph,
        start_id,
        target_id,
        conditions.preference,
        conditions.ambient_temperature_c,
    );
    if path.is_empty() {
        info!("No walking path between {start_id} and {target_id}");
        return None;
    }

    debug!(
        "Found {} edge path ({:.0} m) from {start_id} to {target_id}",
        path.len(),
        path.total_distance_m()
    );
    Some(WalkingRoute::from_path(
        graph,
        &path,
        origin,
        destination,
        conditions.walking_speed_mps,
    ))
}
