//! Navigation session behaviour against scripted route providers.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use geo::Point;
use paddock_core::prelude::*;
use tokio::sync::Notify;

const DESTINATION_NAME: &str = "Grandstand B";

fn destination() -> Point<f64> {
    Point::new(-1.0150, 52.0720)
}

/// Straight walk north, about 222 m
fn north_route() -> WalkingRoute {
    WalkingRoute::from_points(
        vec![
            Point::new(-1.0150, 52.0700),
            Point::new(-1.0150, 52.0710),
            destination(),
        ],
        1.3,
    )
}

/// Alternative used for reroutes, starting east of the original line
fn eastern_route() -> WalkingRoute {
    WalkingRoute::from_points(
        vec![
            Point::new(-1.0135, 52.0705),
            Point::new(-1.0135, 52.0720),
            destination(),
        ],
        1.3,
    )
}

fn fix_at(latitude: f64, longitude: f64) -> LocationFix {
    LocationFix::new(latitude, longitude).with_accuracy(5.0)
}

fn on_route_fix() -> LocationFix {
    fix_at(52.0705, -1.0150)
}

/// About 100 m east of the northbound line
fn astray_fix() -> LocationFix {
    fix_at(52.0705, -1.0135)
}

/// Answers requests from a queue and returns `None` once it runs dry
#[derive(Default)]
struct ScriptedProvider {
    responses: Mutex<VecDeque<Option<WalkingRoute>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(responses: impl IntoIterator<Item = Option<WalkingRoute>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    fn push(&self, response: Option<WalkingRoute>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteProvider for ScriptedProvider {
    async fn get_route(
        &self,
        _origin: Point<f64>,
        _destination: Point<f64>,
        _avoid_congestion: bool,
    ) -> Option<WalkingRoute> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.lock().unwrap().pop_front().flatten()
    }
}

/// Holds every request until the test opens the gate
#[derive(Default)]
struct GatedProvider {
    gate: Notify,
    calls: AtomicUsize,
}

impl RouteProvider for GatedProvider {
    async fn get_route(
        &self,
        _origin: Point<f64>,
        _destination: Point<f64>,
        _avoid_congestion: bool,
    ) -> Option<WalkingRoute> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Some(north_route())
    }
}

fn session(
    responses: impl IntoIterator<Item = Option<WalkingRoute>>,
) -> NavigationSession<ScriptedProvider> {
    NavigationSession::new(
        ScriptedProvider::new(responses),
        NavigationConfig::default(),
    )
}

fn active(session: &NavigationSession<impl RouteProvider>) -> ActiveNavigation {
    match session.state() {
        NavigationState::Active(active) => active,
        other => panic!("expected active navigation, got {other:?}"),
    }
}

#[tokio::test]
async fn start_with_fix_activates_route() {
    let session = session([Some(north_route())]);
    let started = session
        .start(destination(), DESTINATION_NAME, Some(fix_at(52.0700, -1.0150)))
        .await;

    assert!(started);
    let active = active(&session);
    assert_eq!(active.destination_name, DESTINATION_NAME);
    assert_eq!(active.remaining_distance, active.route.distance_m);
    assert!(!active.is_off_route);
}

#[tokio::test]
async fn start_without_fix_waits_for_first_fix() {
    let session = session([Some(north_route())]);
    assert!(session.start(destination(), DESTINATION_NAME, None).await);
    assert!(matches!(
        session.state(),
        NavigationState::WaitingForFix { .. }
    ));
    assert_eq!(session.provider().calls(), 0);

    session.update_location(fix_at(52.0700, -1.0150)).await;

    assert_eq!(session.provider().calls(), 1);
    assert!(session.state().is_active());
}

#[tokio::test]
async fn missing_route_reports_error() {
    let session = session([None]);
    let started = session
        .start(destination(), DESTINATION_NAME, Some(on_route_fix()))
        .await;

    assert!(!started);
    match session.state() {
        NavigationState::Error { message } => assert!(message.contains(DESTINATION_NAME)),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn progress_follows_the_walker() {
    let session = session([Some(north_route())]);
    session
        .start(destination(), DESTINATION_NAME, Some(fix_at(52.0700, -1.0150)))
        .await;
    let before = active(&session);

    session.update_location(fix_at(52.0712, -1.0150)).await;

    let after = active(&session);
    assert_eq!(after.closest_point_index, 1);
    assert!(after.remaining_distance < before.remaining_distance);
    assert!(after.eta_seconds < before.eta_seconds);
    assert!((after.remaining_distance - 89.0).abs() < 1.0);
    assert!(Arc::ptr_eq(&before.route, &after.route));
}

#[tokio::test]
async fn stop_is_idempotent() {
    let session = session([Some(north_route())]);
    let mut states = session.subscribe();

    session.stop();
    assert!(session.state().is_idle());
    assert!(!states.has_changed().unwrap());

    session
        .start(destination(), DESTINATION_NAME, Some(on_route_fix()))
        .await;
    session.stop();
    assert!(session.state().is_idle());
    states.borrow_and_update();

    session.stop();
    session.stop();
    assert!(session.state().is_idle());
    assert!(!states.has_changed().unwrap());
}

#[tokio::test]
async fn failed_reroute_keeps_route_flagged_off_route() {
    let session = session([Some(north_route())]);
    session
        .start(destination(), DESTINATION_NAME, Some(on_route_fix()))
        .await;
    let original = active(&session).route;

    // A single astray fix is not enough to leave the route
    session.update_location(astray_fix()).await;
    let first = active(&session);
    assert!(!first.is_off_route);
    assert_eq!(session.provider().calls(), 1);

    session.update_location(astray_fix()).await;

    assert_eq!(session.provider().calls(), 2);
    let kept = active(&session);
    assert!(kept.is_off_route);
    assert!(Arc::ptr_eq(&kept.route, &original));
    assert!(kept.distance_to_route > 90.0);
    assert_eq!(kept.destination_name, DESTINATION_NAME);

    // Back on the line, the flag clears without another request
    session.update_location(on_route_fix()).await;
    assert!(!active(&session).is_off_route);
    assert_eq!(session.provider().calls(), 2);
}

#[tokio::test]
async fn successful_reroute_replaces_route() {
    let session = session([Some(north_route()), Some(eastern_route())]);
    session
        .start(destination(), DESTINATION_NAME, Some(on_route_fix()))
        .await;

    session.update_location(astray_fix()).await;
    session.update_location(astray_fix()).await;

    let rerouted = active(&session);
    assert!(!rerouted.is_off_route);
    assert_eq!(rerouted.route.points, eastern_route().points);
    assert_eq!(rerouted.current_step_index, 0);
}

#[tokio::test(start_paused = true)]
async fn staleness_refresh_is_throttled() {
    let session = session([Some(north_route())]);
    let fix = on_route_fix();
    session
        .start(destination(), DESTINATION_NAME, Some(fix))
        .await;

    assert!(!session.recalculate_if_stale(&fix).await);
    tokio::time::advance(Duration::from_secs(29)).await;
    assert!(!session.recalculate_if_stale(&fix).await);
    assert_eq!(session.provider().calls(), 1);

    session.provider().push(Some(north_route()));
    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(session.recalculate_if_stale(&fix).await);
    assert_eq!(session.provider().calls(), 2);
    assert!(!session.recalculate_if_stale(&fix).await);
    assert_eq!(session.provider().calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_waits_a_full_interval() {
    let session = session([Some(north_route())]);
    let fix = on_route_fix();
    session
        .start(destination(), DESTINATION_NAME, Some(fix))
        .await;
    let route = active(&session).route;

    tokio::time::advance(Duration::from_secs(31)).await;
    assert!(!session.recalculate_if_stale(&fix).await);
    assert_eq!(session.provider().calls(), 2);
    assert!(Arc::ptr_eq(&active(&session).route, &route));

    tokio::time::advance(Duration::from_secs(10)).await;
    assert!(!session.recalculate_if_stale(&fix).await);
    assert_eq!(session.provider().calls(), 2);
}

#[tokio::test]
async fn refresh_only_applies_to_active_walks() {
    let session = session([Some(north_route())]);
    assert!(!session.recalculate_if_stale(&on_route_fix()).await);
    session.start(destination(), DESTINATION_NAME, None).await;
    assert!(!session.recalculate_if_stale(&on_route_fix()).await);
    assert_eq!(session.provider().calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn arrival_is_final() {
    let session = session([Some(north_route())]);
    session
        .start(destination(), DESTINATION_NAME, Some(on_route_fix()))
        .await;

    session.update_location(fix_at(52.07195, -1.0150)).await;
    assert_eq!(
        session.state(),
        NavigationState::Arrived {
            destination_name: DESTINATION_NAME.to_string()
        }
    );

    session.provider().push(Some(eastern_route()));
    for _ in 0..3 {
        session.update_location(astray_fix()).await;
    }
    tokio::time::advance(Duration::from_secs(60)).await;
    assert!(!session.recalculate_if_stale(&astray_fix()).await);

    assert!(matches!(session.state(), NavigationState::Arrived { .. }));
    assert_eq!(session.provider().calls(), 1);
}

#[tokio::test]
async fn stop_discards_pending_route() {
    let session = Arc::new(NavigationSession::new(
        GatedProvider::default(),
        NavigationConfig::default(),
    ));
    let mut states = session.subscribe();

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move {
            session
                .start(destination(), DESTINATION_NAME, Some(on_route_fix()))
                .await
        }
    });
    states
        .wait_for(|state| matches!(state, NavigationState::Loading { .. }))
        .await
        .unwrap();

    session.stop();
    session.provider().gate.notify_one();

    assert!(!pending.await.unwrap());
    assert!(session.state().is_idle());
}

#[tokio::test]
async fn newer_start_supersedes_pending_one() {
    let session = Arc::new(NavigationSession::new(
        GatedProvider::default(),
        NavigationConfig::default(),
    ));
    let mut states = session.subscribe();

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move {
            session
                .start(destination(), "Old destination", Some(on_route_fix()))
                .await
        }
    });
    states
        .wait_for(|state| state.destination_name() == Some("Old destination"))
        .await
        .unwrap();

    assert!(session.start(destination(), DESTINATION_NAME, None).await);
    session.provider().gate.notify_one();

    assert!(!first.await.unwrap());
    assert_eq!(
        session.state().destination_name(),
        Some(DESTINATION_NAME)
    );
    assert!(matches!(
        session.state(),
        NavigationState::WaitingForFix { .. }
    ));
}

#[tokio::test]
async fn overlapping_fixes_are_dropped() {
    let session = Arc::new(NavigationSession::new(
        GatedProvider::default(),
        NavigationConfig::default(),
    ));
    session.start(destination(), DESTINATION_NAME, None).await;
    let mut states = session.subscribe();

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.update_location(on_route_fix()).await }
    });
    states
        .wait_for(|state| matches!(state, NavigationState::Loading { .. }))
        .await
        .unwrap();

    session.update_location(on_route_fix()).await;
    assert_eq!(session.provider().calls.load(Ordering::SeqCst), 1);

    session.provider().gate.notify_one();
    first.await.unwrap();
    assert!(session.state().is_active());
}
