use std::ops::RangeInclusive;

use geo::{Distance, Haversine, Point};

use crate::Meters;

/// Projection of a fix onto a route polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Index of the route point that starts the matched segment
    pub closest_index: usize,
    /// Distance from the fix to the matched point, infinite for an empty route
    pub distance_to_route_m: Meters,
    /// Closest point on the matched segment
    pub snapped_point: Point<f64>,
    /// Position of `snapped_point` along the segment, 0 at its start and 1 at its end
    pub segment_fraction: f64,
}

pub trait Snapper: Send + Sync {
    /// Projects `fix` onto `route_points`.
    ///
    /// `last_index_hint` is the previous `closest_index`; implementations may
    /// search around it first using the window sizes in `search_radii`.
    fn snap(
        &self,
        fix: Point<f64>,
        route_points: &[Point<f64>],
        last_index_hint: usize,
        search_radii: &[usize],
    ) -> SnapResult;
}

/// Snapper that searches growing windows of segments around the last match.
///
/// A window is accepted as soon as its best match is within
/// `accept_distance_m`; otherwise the next radius is tried, and the whole
/// route is scanned last. Starting near the hint keeps matches from jumping
/// to a far part of a route that passes the same spot twice.
#[derive(Debug, Clone)]
pub struct WindowedSnapper {
    pub accept_distance_m: Meters,
}

impl WindowedSnapper {
    pub fn new(accept_distance_m: Meters) -> Self {
        Self { accept_distance_m }
    }
}

impl Default for WindowedSnapper {
    fn default() -> Self {
        Self::new(40.0)
    }
}

impl Snapper for WindowedSnapper {
    fn snap(
        &self,
        fix: Point<f64>,
        route_points: &[Point<f64>],
        last_index_hint: usize,
        search_radii: &[usize],
    ) -> SnapResult {
        match route_points {
            [] => {
                return SnapResult {
                    closest_index: 0,
                    distance_to_route_m: f64::INFINITY,
                    snapped_point: fix,
                    segment_fraction: 0.0,
                };
            }
            [only] => {
                return SnapResult {
                    closest_index: 0,
                    distance_to_route_m: Haversine.distance(fix, *only),
                    snapped_point: *only,
                    segment_fraction: 0.0,
                };
            }
            _ => {}
        }

        let last_segment = route_points.len() - 2;
        let hint = last_index_hint.min(last_segment);

        for &radius in search_radii {
            let lo = hint.saturating_sub(radius);
            let hi = hint.saturating_add(radius).min(last_segment);
            let best = best_in_window(fix, route_points, lo..=hi);

            // A match pinned to the window border may continue past it
            let pinned_high = best.closest_index == hi && best.segment_fraction >= 1.0 && hi < last_segment;
            let pinned_low = best.closest_index == lo && best.segment_fraction <= 0.0 && lo > 0;
            if best.distance_to_route_m <= self.accept_distance_m && !pinned_high && !pinned_low {
                return best;
            }
        }

        best_in_window(fix, route_points, 0..=last_segment)
    }
}

fn best_in_window(
    fix: Point<f64>,
    route_points: &[Point<f64>],
    window: RangeInclusive<usize>,
) -> SnapResult {
    let mut best = SnapResult {
        closest_index: *window.start(),
        distance_to_route_m: f64::INFINITY,
        snapped_point: fix,
        segment_fraction: 0.0,
    };

    for index in window {
        let (snapped_point, segment_fraction) =
            project_onto_segment(fix, route_points[index], route_points[index + 1]);
        let distance = Haversine.distance(fix, snapped_point);
        if distance < best.distance_to_route_m {
            best = SnapResult {
                closest_index: index,
                distance_to_route_m: distance,
                snapped_point,
                segment_fraction,
            };
        }
    }

    best
}

/// Closest point to `p` on segment `a`-`b`, in a local equirectangular frame
/// centred on `p`. Accurate to well under a meter at venue scale.
fn project_onto_segment(p: Point<f64>, a: Point<f64>, b: Point<f64>) -> (Point<f64>, f64) {
    let cos_lat = p.y().to_radians().cos();
    let local = |q: Point<f64>| ((q.x() - p.x()) * cos_lat, q.y() - p.y());
    let (ax, ay) = local(a);
    let (bx, by) = local(b);
    let (dx, dy) = (bx - ax, by - ay);

    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f64::EPSILON {
        0.0
    } else {
        ((-ax * dx - ay * dy) / length_sq).clamp(0.0, 1.0)
    };

    let projected = Point::new(a.x() + (b.x() - a.x()) * t, a.y() + (b.y() - a.y()) * t);
    (projected, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Straight northbound route, points ~11 m apart
    fn northbound(len: usize) -> Vec<Point<f64>> {
        (0..len)
            .map(|i| Point::new(-1.0150, 52.0700 + 0.0001 * i as f64))
            .collect()
    }

    #[test]
    fn fix_on_route_has_zero_distance() {
        let points = northbound(10);
        let fix = Point::new(-1.0150, 52.07035);
        let snap = WindowedSnapper::default().snap(fix, &points, 0, &[2, 8]);
        assert_eq!(snap.closest_index, 3);
        assert!(snap.distance_to_route_m < 0.5);
        assert!((snap.segment_fraction - 0.5).abs() < 0.01);
    }

    #[test]
    fn lateral_offset_is_measured() {
        let points = northbound(10);
        // ~0.0003 degrees of longitude at 52N is ~20.5 m
        let fix = Point::new(-1.0147, 52.0702);
        let snap = WindowedSnapper::default().snap(fix, &points, 0, &[4]);
        assert!((snap.distance_to_route_m - 20.5).abs() < 1.0);
        assert!((snap.snapped_point.x() + 1.0150).abs() < 1e-9);
    }

    #[test]
    fn far_fix_falls_back_to_full_scan() {
        let points = northbound(200);
        let fix = Point::new(-1.0150, 52.0700 + 0.0001 * 150.5);
        let snap = WindowedSnapper::default().snap(fix, &points, 0, &[2, 8]);
        assert_eq!(snap.closest_index, 150);
        assert!(snap.distance_to_route_m < 0.5);
    }

    #[test]
    fn hint_past_end_is_clamped() {
        let points = northbound(3);
        let fix = Point::new(-1.0150, 52.07019);
        let snap = WindowedSnapper::default().snap(fix, &points, 99, &[1]);
        assert_eq!(snap.closest_index, 1);
    }

    #[test]
    fn degenerate_routes() {
        let snapper = WindowedSnapper::default();
        let fix = Point::new(-1.0150, 52.0700);
        let empty = snapper.snap(fix, &[], 0, &[4]);
        assert!(empty.distance_to_route_m.is_infinite());

        let single = snapper.snap(fix, &[Point::new(-1.0150, 52.0701)], 0, &[4]);
        assert_eq!(single.closest_index, 0);
        assert!((single.distance_to_route_m - 11.1).abs() < 0.5);
    }
}
