use std::sync::Arc;

use geo::Point;

use crate::{
    Meters, Seconds,
    model::{RouteStep, WalkingRoute},
};

/// Observable state of a navigation session
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NavigationState {
    #[default]
    Idle,
    Loading {
        destination_name: String,
    },
    WaitingForFix {
        destination: Point<f64>,
        destination_name: String,
    },
    Active(ActiveNavigation),
    Arrived {
        destination_name: String,
    },
    Error {
        message: String,
    },
}

impl NavigationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, NavigationState::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, NavigationState::Active(_))
    }

    pub fn as_active(&self) -> Option<&ActiveNavigation> {
        match self {
            NavigationState::Active(active) => Some(active),
            _ => None,
        }
    }

    pub fn destination_name(&self) -> Option<&str> {
        match self {
            NavigationState::Loading { destination_name }
            | NavigationState::WaitingForFix {
                destination_name, ..
            }
            | NavigationState::Arrived { destination_name } => Some(destination_name),
            NavigationState::Active(active) => Some(&active.destination_name),
            NavigationState::Idle | NavigationState::Error { .. } => None,
        }
    }

    /// Short name of the variant, for logs
    pub fn label(&self) -> &'static str {
        match self {
            NavigationState::Idle => "idle",
            NavigationState::Loading { .. } => "loading",
            NavigationState::WaitingForFix { .. } => "waiting-for-fix",
            NavigationState::Active(active) if active.is_off_route => "active (off route)",
            NavigationState::Active(_) => "active",
            NavigationState::Arrived { .. } => "arrived",
            NavigationState::Error { .. } => "error",
        }
    }
}

/// Progress along the route of an active walk.
///
/// Every location update publishes a new value; the route itself is shared
/// between snapshots and only replaced by a reroute.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNavigation {
    pub route: Arc<WalkingRoute>,
    pub destination: Point<f64>,
    pub destination_name: String,
    pub current_step_index: usize,
    pub distance_to_next_maneuver: Meters,
    pub remaining_distance: Meters,
    pub eta_seconds: Seconds,
    pub is_off_route: bool,
    pub closest_point_index: usize,
    pub distance_to_route: Meters,
}

impl ActiveNavigation {
    /// Progress at the very start of a freshly computed route
    pub fn fresh(
        route: Arc<WalkingRoute>,
        destination: Point<f64>,
        destination_name: impl Into<String>,
    ) -> Self {
        let distance_to_next_maneuver = route
            .steps
            .first()
            .map_or(route.distance_m, |step| step.distance_m);

        Self {
            destination,
            destination_name: destination_name.into(),
            current_step_index: 0,
            distance_to_next_maneuver,
            remaining_distance: route.distance_m,
            eta_seconds: route.duration_s,
            is_off_route: false,
            closest_point_index: 0,
            distance_to_route: 0.0,
            route,
        }
    }

    pub fn current_step(&self) -> Option<&RouteStep> {
        self.route.steps.get(self.current_step_index)
    }

    pub fn next_step(&self) -> Option<&RouteStep> {
        self.route.steps.get(self.current_step_index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Maneuver;

    #[test]
    fn fresh_progress_uses_route_totals() {
        let route = Arc::new(WalkingRoute::from_points(
            vec![
                Point::new(-1.0150, 52.0700),
                Point::new(-1.0150, 52.0710),
                Point::new(-1.0130, 52.0710),
            ],
            1.3,
        ));
        let active = ActiveNavigation::fresh(route.clone(), Point::new(-1.0130, 52.0710), "Pit Lane");

        assert_eq!(active.current_step_index, 0);
        assert_eq!(active.remaining_distance, route.distance_m);
        assert_eq!(active.eta_seconds, route.duration_s);
        assert_eq!(active.distance_to_next_maneuver, route.steps[0].distance_m);
        assert_eq!(active.next_step().map(|s| s.maneuver), Some(Maneuver::Right));
        assert!(!active.is_off_route);
    }

    #[test]
    fn destination_name_of_each_state() {
        assert_eq!(NavigationState::Idle.destination_name(), None);
        let loading = NavigationState::Loading {
            destination_name: "Paddock".into(),
        };
        assert_eq!(loading.destination_name(), Some("Paddock"));
        assert_eq!(loading.label(), "loading");
    }
}
