//! Route search over the walking graph

pub mod astar;
pub mod cost;
pub mod one_to_many;
mod to_geojson;

pub use astar::{find_route, heuristic, route_between};
pub use cost::{HEAT_PENALTY_WEIGHT, edge_cost};
pub use one_to_many::find_routes_one_to_many;
