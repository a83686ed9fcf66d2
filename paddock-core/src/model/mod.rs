//! Data model for venue walking guidance
//!
//! Contains the walkable path network and the route types produced on top of it.

pub mod fix;
pub mod route;
pub mod venue;
pub mod walking_route;

pub use fix::LocationFix;
pub use route::{Route, RoutePreference};
pub use venue::{Edge, IndexedPoint, Node, NodeId, SurfaceType, WalkGraph};
pub use walking_route::{Maneuver, RouteStep, WalkingRoute};
