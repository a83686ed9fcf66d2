//! Tunables for routing and navigation

use std::time::Duration;

use serde::Deserialize;

use crate::{Celsius, Meters, RoutePreference};

/// Settings for the navigation state machine and its trackers
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NavigationConfig {
    /// Minimum age of a route before a staleness refresh (default: 30)
    #[serde(default = "default_recalculation_interval")]
    pub recalculation_interval_secs: u64,

    /// Distance to the destination that counts as arrived (default: 15.0)
    #[serde(default = "default_arrival_radius")]
    pub arrival_radius_m: Meters,

    /// Distance from the route beyond which a fix is considered astray (default: 25.0)
    #[serde(default = "default_off_route_threshold")]
    pub off_route_threshold_m: Meters,

    /// Astray fixes in a row before declaring off-route (default: 2)
    #[serde(default = "default_off_route_consecutive")]
    pub off_route_consecutive_fixes: u32,

    /// Cap on how much reported GPS inaccuracy widens the off-route threshold (default: 20.0)
    #[serde(default = "default_accuracy_slack")]
    pub max_accuracy_slack_m: Meters,

    /// Snapping windows in route points around the last snap (default: [4, 16, 64])
    #[serde(default = "default_snap_search_radii")]
    pub snap_search_radii: Vec<usize>,

    /// Match distance at which a snapping window is accepted (default: 40.0)
    #[serde(default = "default_snap_accept_distance")]
    pub snap_accept_distance_m: Meters,
}

impl NavigationConfig {
    pub fn recalculation_interval(&self) -> Duration {
        Duration::from_secs(self.recalculation_interval_secs)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            recalculation_interval_secs: default_recalculation_interval(),
            arrival_radius_m: default_arrival_radius(),
            off_route_threshold_m: default_off_route_threshold(),
            off_route_consecutive_fixes: default_off_route_consecutive(),
            max_accuracy_slack_m: default_accuracy_slack(),
            snap_search_radii: default_snap_search_radii(),
            snap_accept_distance_m: default_snap_accept_distance(),
        }
    }
}

/// Settings for local route computation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub preference: RoutePreference,

    /// Ambient temperature fed to the cost model (default: 20.0)
    #[serde(default = "default_temperature")]
    pub ambient_temperature_c: Celsius,

    /// Walking speed used for route durations (default: 1.3)
    #[serde(default = "default_walking_speed")]
    pub walking_speed_mps: f64,

    /// Farthest a walker may be from the network to be routed (default: 150.0)
    #[serde(default = "default_max_snap_distance")]
    pub max_snap_distance_m: Meters,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            preference: RoutePreference::default(),
            ambient_temperature_c: default_temperature(),
            walking_speed_mps: default_walking_speed(),
            max_snap_distance_m: default_max_snap_distance(),
        }
    }
}

fn default_recalculation_interval() -> u64 {
    30
}

fn default_arrival_radius() -> Meters {
    15.0
}

fn default_off_route_threshold() -> Meters {
    25.0
}

fn default_off_route_consecutive() -> u32 {
    2
}

fn default_accuracy_slack() -> Meters {
    20.0
}

fn default_snap_search_radii() -> Vec<usize> {
    vec![4, 16, 64]
}

fn default_snap_accept_distance() -> Meters {
    40.0
}

fn default_temperature() -> Celsius {
    20.0
}

fn default_walking_speed() -> f64 {
    1.3
}

fn default_max_snap_distance() -> Meters {
    150.0
}
