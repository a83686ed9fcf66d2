//! This module is responsible for loading venue path data from files
//! or building it programmatically into a routable walking graph.

mod builder;
mod json;
pub mod raw_types;

pub use builder::VenueGraphBuilder;
pub use json::{load_walk_graph, walk_graph_from_json};
