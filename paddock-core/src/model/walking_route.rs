//! Navigable route: polyline, maneuvers, totals

use geo::{Bearing, Coord, Distance, Haversine, LineString, Point};
use itertools::Itertools;

use super::{Route, WalkGraph};
use crate::{Meters, Seconds};

/// Consecutive polyline points closer than this are merged
const MIN_POINT_SPACING_M: f64 = 1.0;

/// Kind of maneuver that starts a route step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Maneuver {
    Depart,
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
    SlightRight,
    Right,
    SharpRight,
    UTurn,
    Arrive,
}

impl Maneuver {
    /// Classifies a heading change in degrees, positive values turn right
    pub fn from_turn(delta_deg: f64) -> Self {
        let magnitude = delta_deg.abs();
        let right = delta_deg > 0.0;
        match magnitude {
            m if m < 20.0 => Maneuver::Straight,
            m if m < 60.0 => {
                if right {
                    Maneuver::SlightRight
                } else {
                    Maneuver::SlightLeft
                }
            }
            m if m < 120.0 => {
                if right {
                    Maneuver::Right
                } else {
                    Maneuver::Left
                }
            }
            m if m < 165.0 => {
                if right {
                    Maneuver::SharpRight
                } else {
                    Maneuver::SharpLeft
                }
            }
            _ => Maneuver::UTurn,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Maneuver::Depart => "Head off along the path",
            Maneuver::Straight => "Continue straight",
            Maneuver::SlightLeft => "Bear left",
            Maneuver::Left => "Turn left",
            Maneuver::SharpLeft => "Turn sharp left",
            Maneuver::SlightRight => "Bear right",
            Maneuver::Right => "Turn right",
            Maneuver::SharpRight => "Turn sharp right",
            Maneuver::UTurn => "Turn around",
            Maneuver::Arrive => "You have arrived",
        }
    }
}

/// One instruction of a walking route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    pub maneuver: Maneuver,
    /// Index into [`WalkingRoute::points`] where the maneuver happens
    pub point_index: usize,
    /// Distance walked on this step until the next maneuver
    pub distance_m: Meters,
}

impl RouteStep {
    pub fn new(maneuver: Maneuver, point_index: usize) -> Self {
        Self {
            maneuver,
            point_index,
            distance_m: 0.0,
        }
    }

    pub fn instruction(&self) -> &'static str {
        self.maneuver.instruction()
    }
}

/// Route a walker is guided along.
///
/// Produced by a route provider, either from a local graph search or from a
/// remote routing service. Cumulative distances are precomputed so progress
/// queries stay cheap on every location fix.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingRoute {
    pub points: Vec<Point<f64>>,
    pub steps: Vec<RouteStep>,
    pub distance_m: Meters,
    pub duration_s: Seconds,
    cumulative_m: Vec<Meters>,
}

impl WalkingRoute {
    /// Builds a route from provider supplied geometry and steps.
    ///
    /// Steps are derived from the geometry when none are given. Given steps
    /// index into `points`, so the geometry is then kept untouched.
    pub fn new(points: Vec<Point<f64>>, steps: Vec<RouteStep>, duration_s: Seconds) -> Self {
        let (points, mut steps) = if steps.is_empty() {
            let points = dedup_points(points);
            let steps = derive_steps(&points);
            (points, steps)
        } else {
            (points, steps)
        };
        let cumulative_m = cumulative_distances(&points);
        let distance_m = cumulative_m.last().copied().unwrap_or(0.0);
        fill_step_distances(&mut steps, &cumulative_m);

        Self {
            points,
            steps,
            distance_m,
            duration_s,
            cumulative_m,
        }
    }

    /// Builds a route from bare geometry, timing it at a constant walking speed
    pub fn from_points(points: Vec<Point<f64>>, walking_speed_mps: f64) -> Self {
        let mut route = Self::new(points, Vec::new(), 0.0);
        route.duration_s = walking_duration(route.distance_m, walking_speed_mps);
        route
    }

    /// Straight line route, used when both ends snap to the same graph node
    pub fn direct(origin: Point<f64>, destination: Point<f64>, walking_speed_mps: f64) -> Self {
        Self::from_points(vec![origin, destination], walking_speed_mps)
    }

    /// Converts a graph search result into a navigable route.
    ///
    /// The walker's actual origin and destination are attached to both ends
    /// so the polyline starts where they stand. Distances come from the
    /// polyline geometry, not from the edge attributes.
    pub fn from_path(
        graph: &WalkGraph,
        path: &Route,
        origin: Point<f64>,
        destination: Point<f64>,
        walking_speed_mps: f64,
    ) -> Self {
        let mut points = Vec::with_capacity(path.len() + 3);
        points.push(origin);
        points.extend(
            path.node_ids()
                .iter()
                .filter_map(|id| graph.node(id))
                .map(|node| node.geometry),
        );
        points.push(destination);
        Self::from_points(points, walking_speed_mps)
    }

    pub fn origin(&self) -> Option<Point<f64>> {
        self.points.first().copied()
    }

    pub fn destination(&self) -> Option<Point<f64>> {
        self.points.last().copied()
    }

    /// Distance from the route start to the point at `index`
    pub fn cumulative_distance(&self, index: usize) -> Meters {
        self.cumulative_m
            .get(index)
            .or(self.cumulative_m.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Length of the segment starting at point `index`, zero past the end
    pub fn segment_length(&self, index: usize) -> Meters {
        match (self.cumulative_m.get(index), self.cumulative_m.get(index + 1)) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    pub fn geometry(&self) -> LineString<f64> {
        self.points.iter().map(|p| Coord::from(*p)).collect()
    }
}

fn walking_duration(distance_m: Meters, walking_speed_mps: f64) -> Seconds {
    if walking_speed_mps > 0.0 {
        distance_m / walking_speed_mps
    } else {
        0.0
    }
}

fn dedup_points(points: Vec<Point<f64>>) -> Vec<Point<f64>> {
    let mut out: Vec<Point<f64>> = Vec::with_capacity(points.len());
    for point in points {
        match out.last() {
            Some(last) if Haversine.distance(*last, point) < MIN_POINT_SPACING_M => {}
            _ => out.push(point),
        }
    }
    out
}

fn cumulative_distances(points: &[Point<f64>]) -> Vec<Meters> {
    let mut cumulative = Vec::with_capacity(points.len());
    if points.is_empty() {
        return cumulative;
    }
    cumulative.push(0.0);
    let mut total = 0.0;
    for (a, b) in points.iter().tuple_windows() {
        total += Haversine.distance(*a, *b);
        cumulative.push(total);
    }
    cumulative
}

/// Signed heading change at the middle point, in (-180, 180]
fn turn_angle(before: Point<f64>, at: Point<f64>, after: Point<f64>) -> f64 {
    let incoming = Haversine.bearing(before, at);
    let outgoing = Haversine.bearing(at, after);
    let mut delta = (outgoing - incoming) % 360.0;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

fn derive_steps(points: &[Point<f64>]) -> Vec<RouteStep> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut steps = vec![RouteStep::new(Maneuver::Depart, 0)];
    for (offset, (before, at, after)) in points.iter().tuple_windows().enumerate() {
        let maneuver = Maneuver::from_turn(turn_angle(*before, *at, *after));
        if maneuver != Maneuver::Straight {
            steps.push(RouteStep::new(maneuver, offset + 1));
        }
    }
    steps.push(RouteStep::new(Maneuver::Arrive, points.len() - 1));
    steps
}

fn fill_step_distances(steps: &mut [RouteStep], cumulative_m: &[Meters]) {
    let at = |index: usize| {
        cumulative_m
            .get(index)
            .or(cumulative_m.last())
            .copied()
            .unwrap_or(0.0)
    };
    let starts: Vec<usize> = steps.iter().map(|step| step.point_index).collect();
    for (i, step) in steps.iter_mut().enumerate() {
        step.distance_m = match starts.get(i + 1) {
            Some(&next) => (at(next) - at(step.point_index)).max(0.0),
            None => 0.0,
        };
    }
}
