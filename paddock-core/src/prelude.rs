pub use crate::HEAT_THRESHOLD_C;
pub use crate::error::Error;

// Re-export key components
pub use crate::config::{NavigationConfig, RoutingConfig};
pub use crate::loading::{VenueGraphBuilder, load_walk_graph, walk_graph_from_json};
pub use crate::model::{
    Edge, Maneuver, Node, Route, RoutePreference, RouteStep, SurfaceType, WalkGraph,
    WalkingRoute,
};
pub use crate::navigation::{
    ActiveNavigation, GraphRouteProvider, LocationFix, NavigationSession, NavigationState,
    RouteProvider,
};
pub use crate::routing::{
    edge_cost, find_route, find_routes_one_to_many, heuristic, route_between,
};
pub use crate::tracking::{
    HysteresisDetector, OffRouteDetector, SequentialStepDetector, SnapResult, Snapper,
    StepDetector, StepProgress, WindowedSnapper,
};

// Core scalar types
pub use crate::Celsius;
pub use crate::Meters;
pub use crate::Seconds;
