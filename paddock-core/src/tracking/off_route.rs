use super::snap::SnapResult;
use crate::{Meters, NavigationConfig, model::LocationFix};

/// Decides whether the walker has left the route.
///
/// Implementations may keep state between fixes; the navigation session
/// calls [`reset`](OffRouteDetector::reset) whenever it stops or switches
/// to a new route.
pub trait OffRouteDetector: Send {
    fn is_off_route(&mut self, fix: &LocationFix, snap: &SnapResult) -> bool;

    fn reset(&mut self);
}

/// Off-route detector with hysteresis.
///
/// A fix counts as astray when it is farther from the route than the
/// threshold, widened by the reported GPS accuracy up to a cap. The walker
/// is off-route only after `required_consecutive` astray fixes in a row, so a
/// single bad sample does not trigger a reroute.
#[derive(Debug, Clone)]
pub struct HysteresisDetector {
    threshold_m: Meters,
    max_accuracy_slack_m: Meters,
    required_consecutive: u32,
    consecutive: u32,
}

impl HysteresisDetector {
    pub fn new(threshold_m: Meters, max_accuracy_slack_m: Meters, required_consecutive: u32) -> Self {
        Self {
            threshold_m,
            max_accuracy_slack_m,
            required_consecutive: required_consecutive.max(1),
            consecutive: 0,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(
            config.off_route_threshold_m,
            config.max_accuracy_slack_m,
            config.off_route_consecutive_fixes,
        )
    }

    /// Astray fixes seen in a row so far
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    fn effective_threshold(&self, fix: &LocationFix) -> Meters {
        let slack = fix
            .accuracy_m
            .map(f64::from)
            .filter(|accuracy| accuracy.is_finite())
            .map_or(0.0, |accuracy| accuracy.clamp(0.0, self.max_accuracy_slack_m));
        self.threshold_m + slack
    }
}

impl Default for HysteresisDetector {
    fn default() -> Self {
        Self::from_config(&NavigationConfig::default())
    }
}

impl OffRouteDetector for HysteresisDetector {
    fn is_off_route(&mut self, fix: &LocationFix, snap: &SnapResult) -> bool {
        if snap.distance_to_route_m > self.effective_threshold(fix) {
            self.consecutive = self.consecutive.saturating_add(1);
        } else {
            self.consecutive = 0;
        }
        self.consecutive >= self.required_consecutive
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}
