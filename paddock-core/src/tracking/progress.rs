use geo::{Distance, Haversine, Point};
use itertools::Itertools;

use super::snap::SnapResult;
use crate::{Meters, Seconds};

/// Distance left to walk from the snapped position to the end of the route
pub fn remaining_distance(snap: &SnapResult, route_points: &[Point<f64>]) -> Meters {
    let Some(&last) = route_points.last() else {
        return 0.0;
    };
    if route_points.len() == 1 {
        return Haversine.distance(snap.snapped_point, last);
    }

    let next = (snap.closest_index + 1).min(route_points.len() - 1);
    let to_next = Haversine.distance(snap.snapped_point, route_points[next]);
    let beyond: Meters = route_points[next..]
        .iter()
        .tuple_windows()
        .map(|(a, b)| Haversine.distance(*a, *b))
        .sum();

    to_next + beyond
}

/// Time left, scaled from the route's total duration by the share of
/// distance still to walk. Live walking speed is not taken into account.
pub fn remaining_time(
    remaining_distance: Meters,
    total_distance: Meters,
    total_duration: Seconds,
) -> Seconds {
    if total_distance <= 0.0 {
        return 0.0;
    }
    total_duration * (remaining_distance / total_distance).max(0.0)
}
