//! Pedestrian guidance engine for venue walking networks.
//!
//! The crate is split into a static part, the walking graph and the A* search
//! over it, and a dynamic part, the [`navigation::NavigationSession`] that
//! follows a walker along a computed route and re-routes when they stray.

pub mod config;
pub mod error;
pub mod loading;
pub mod model;
pub mod navigation;
pub mod prelude;
pub mod routing;
pub mod tracking;

pub use config::{NavigationConfig, RoutingConfig};
pub use error::Error;
pub use model::{Edge, Node, Route, RoutePreference, SurfaceType, WalkGraph, WalkingRoute};

/// Distance in meters
pub type Meters = f64;
/// Duration in seconds
pub type Seconds = f64;
/// Air temperature in degrees Celsius
pub type Celsius = f32;

/// Ambient temperature above which heat avoidance kicks in
pub const HEAT_THRESHOLD_C: Celsius = 28.0;
