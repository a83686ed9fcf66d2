use super::snap::SnapResult;
use crate::{Meters, model::WalkingRoute};

/// Step the walker is on and how far the next maneuver is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepProgress {
    pub step_index: usize,
    pub distance_to_maneuver_m: Meters,
}

pub trait StepDetector: Send + Sync {
    fn current_step(&self, snap: &SnapResult, route: &WalkingRoute) -> StepProgress;
}

/// Picks the last step that starts at or before the snapped position
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStepDetector;

impl StepDetector for SequentialStepDetector {
    fn current_step(&self, snap: &SnapResult, route: &WalkingRoute) -> StepProgress {
        let travelled = route.cumulative_distance(snap.closest_index)
            + snap.segment_fraction * route.segment_length(snap.closest_index);

        let step_index = route
            .steps
            .iter()
            .rposition(|step| step.point_index <= snap.closest_index)
            .unwrap_or(0);

        let maneuver_at = route
            .steps
            .get(step_index + 1)
            .map_or(route.distance_m, |next| {
                route.cumulative_distance(next.point_index)
            });

        StepProgress {
            step_index,
            distance_to_maneuver_m: (maneuver_at - travelled).max(0.0),
        }
    }
}
