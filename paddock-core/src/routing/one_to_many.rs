use rayon::prelude::*;

use super::astar::find_route;
use crate::{
    Celsius,
    model::{Route, RoutePreference, WalkGraph},
};

/// Routes from one start node to many targets, e.g. walking distances from
/// the visitor's position to every food stand on the map.
///
/// Targets are searched independently in parallel; results keep the order
/// of `target_ids`, with empty routes for unreachable or unknown targets.
pub fn find_routes_one_to_many<S>(
    graph: &WalkGraph,
    start_id: &str,
    target_ids: &[S],
    preference: RoutePreference,
    ambient_temperature_c: Celsius,
) -> Vec<Route>
where
    S: AsRef<str> + Sync,
{
    target_ids
        .par_iter()
        .map(|target| {
            find_route(
                graph,
                start_id,
                target.as_ref(),
                preference,
                ambient_temperature_c,
            )
        })
        .collect()
}
