//! Navigation state machine.
//!
//! ```text
//! Idle ──start(no fix)──> WaitingForFix ──fix──┐
//!   │                                           v
//!   └──start(fix)──> Loading ──route──> Active ──near destination──> Arrived
//!                        │                │  ^
//!                        └──no route──> Error  └──off route: reroute / keep route
//! ```
//!
//! `stop()` returns to `Idle` from anywhere. All state changes are published
//! through a `watch` channel while holding the session context lock, which
//! also guards the generation counter: every route request remembers the
//! generation it was issued in, and its result is dropped if `start` or
//! `stop` ran in the meantime.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use geo::{Distance, Haversine, Point};
use log::{debug, info, trace, warn};
use tokio::{sync::watch, time::Instant};

use super::{
    provider::RouteProvider,
    state::{ActiveNavigation, NavigationState},
};
use crate::{
    Meters, NavigationConfig,
    model::{LocationFix, WalkingRoute},
    tracking::{
        HysteresisDetector, OffRouteDetector, SequentialStepDetector, SnapResult, Snapper,
        StepDetector, WindowedSnapper, remaining_distance, remaining_time,
    },
};

/// Mutable per-session bookkeeping, reset on stop and on every new route
struct SessionContext {
    generation: u64,
    last_snap: Option<SnapResult>,
    off_route: Box<dyn OffRouteDetector>,
    last_computed_at: Option<Instant>,
}

impl SessionContext {
    fn reset_trackers(&mut self) {
        self.last_snap = None;
        self.off_route.reset();
    }

    /// Invalidates in-flight requests and forgets everything about the old walk
    fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.reset_trackers();
        self.last_computed_at = None;
        self.generation
    }

    fn adopt_route(&mut self) {
        self.reset_trackers();
        self.last_computed_at = Some(Instant::now());
    }
}

/// What `update_location` has to do after the synchronous part
enum FixOutcome {
    Done,
    Start {
        generation: u64,
        destination: Point<f64>,
        destination_name: String,
    },
    Reroute {
        generation: u64,
        active: ActiveNavigation,
        distance_to_route: Meters,
    },
}

/// Clears the in-flight flag when the update finishes or is cancelled
struct FixInFlight<'a>(&'a AtomicBool);

impl Drop for FixInFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One walk from start to arrival.
///
/// Mutating operations are meant to be driven by a single task. [`stop`]
/// may be called from anywhere at any time, and any number of observers can
/// follow the state through [`subscribe`].
///
/// [`stop`]: NavigationSession::stop
/// [`subscribe`]: NavigationSession::subscribe
pub struct NavigationSession<P> {
    provider: P,
    config: NavigationConfig,
    snapper: Box<dyn Snapper>,
    step_detector: Box<dyn StepDetector>,
    context: Mutex<SessionContext>,
    state: watch::Sender<NavigationState>,
    fix_in_flight: AtomicBool,
}

impl<P: RouteProvider> NavigationSession<P> {
    /// Creates a session with the default trackers tuned by `config`
    pub fn new(provider: P, config: NavigationConfig) -> Self {
        let snapper = WindowedSnapper::new(config.snap_accept_distance_m);
        let off_route = HysteresisDetector::from_config(&config);
        Self::with_trackers(
            provider,
            config,
            Box::new(snapper),
            Box::new(SequentialStepDetector),
            Box::new(off_route),
        )
    }

    pub fn with_trackers(
        provider: P,
        config: NavigationConfig,
        snapper: Box<dyn Snapper>,
        step_detector: Box<dyn StepDetector>,
        off_route: Box<dyn OffRouteDetector>,
    ) -> Self {
        Self {
            provider,
            config,
            snapper,
            step_detector,
            context: Mutex::new(SessionContext {
                generation: 0,
                last_snap: None,
                off_route,
                last_computed_at: None,
            }),
            state: watch::Sender::new(NavigationState::Idle),
            fix_in_flight: AtomicBool::new(false),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Snapshot of the current state
    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    /// Starts navigating to `destination`, superseding any walk in progress.
    ///
    /// Without a fix the session waits for the first location update and
    /// returns `true`. With a fix the route is computed right away; returns
    /// `false` if no route was found (the state is then `Error`) or if the
    /// request was cancelled by `stop` or a newer `start`.
    pub async fn start(
        &self,
        destination: Point<f64>,
        destination_name: impl Into<String>,
        current_fix: Option<LocationFix>,
    ) -> bool {
        let destination_name = destination_name.into();
        let (generation, fix) = {
            let mut ctx = self.context();
            let generation = ctx.next_generation();
            let Some(fix) = current_fix else {
                info!("Navigation to {destination_name} waiting for a location fix");
                self.publish(
                    &ctx,
                    NavigationState::WaitingForFix {
                        destination,
                        destination_name,
                    },
                );
                return true;
            };
            self.publish(
                &ctx,
                NavigationState::Loading {
                    destination_name: destination_name.clone(),
                },
            );
            (generation, fix)
        };

        self.compute_initial_route(generation, fix.position, destination, destination_name)
            .await
    }

    /// Feeds a location fix into the session.
    ///
    /// Only `WaitingForFix` (computes the initial route) and `Active` react
    /// to fixes. A fix delivered while the previous one is still being
    /// processed is dropped, the next fix supersedes it anyway.
    pub async fn update_location(&self, fix: LocationFix) {
        if self.fix_in_flight.swap(true, Ordering::AcqRel) {
            trace!("Dropping location fix - previous update still in progress");
            return;
        }
        let _in_flight = FixInFlight(&self.fix_in_flight);

        let outcome = {
            let mut ctx = self.context();
            let current = self.state();
            match current {
                NavigationState::WaitingForFix {
                    destination,
                    destination_name,
                } => {
                    let generation = ctx.next_generation();
                    self.publish(
                        &ctx,
                        NavigationState::Loading {
                            destination_name: destination_name.clone(),
                        },
                    );
                    FixOutcome::Start {
                        generation,
                        destination,
                        destination_name,
                    }
                }
                NavigationState::Active(active) => self.track(&mut ctx, active, &fix),
                NavigationState::Idle
                | NavigationState::Loading { .. }
                | NavigationState::Arrived { .. }
                | NavigationState::Error { .. } => FixOutcome::Done,
            }
        };

        match outcome {
            FixOutcome::Done => {}
            FixOutcome::Start {
                generation,
                destination,
                destination_name,
            } => {
                self.compute_initial_route(generation, fix.position, destination, destination_name)
                    .await;
            }
            FixOutcome::Reroute {
                generation,
                active,
                distance_to_route,
            } => {
                self.reroute(generation, active, fix.position, distance_to_route)
                    .await;
            }
        }
    }

    /// Refreshes an active route once it is older than the recalculation
    /// interval. Returns whether a new route was adopted.
    ///
    /// The attempt itself restarts the interval, so a failing provider is
    /// not asked again before the interval has passed.
    pub async fn recalculate_if_stale(&self, fix: &LocationFix) -> bool {
        let (generation, destination) = {
            let mut ctx = self.context();
            let NavigationState::Active(active) = self.state() else {
                return false;
            };
            let now = Instant::now();
            if let Some(last) = ctx.last_computed_at
                && now.duration_since(last) < self.config.recalculation_interval()
            {
                return false;
            }
            ctx.last_computed_at = Some(now);
            (ctx.generation, active.destination)
        };

        debug!("Route is stale - requesting a fresh one");
        let Some(route) = self
            .provider
            .get_route(fix.position, destination, true)
            .await
        else {
            debug!("Route refresh failed - keeping the current route");
            return false;
        };

        let mut ctx = self.context();
        if ctx.generation != generation {
            debug!("Discarding refreshed route from a superseded walk");
            return false;
        }
        let NavigationState::Active(current) = self.state() else {
            return false;
        };

        ctx.adopt_route();
        info!(
            "Refreshed route to {} ({:.0} m)",
            current.destination_name, route.distance_m
        );
        self.publish(
            &ctx,
            NavigationState::Active(ActiveNavigation::fresh(
                Arc::new(route),
                current.destination,
                current.destination_name,
            )),
        );
        true
    }

    /// Ends the walk. Safe to call at any time and any number of times;
    /// route requests still in flight are discarded when they complete.
    pub fn stop(&self) {
        let mut ctx = self.context();
        ctx.next_generation();
        let changed = self.state.send_if_modified(|state| {
            if state.is_idle() {
                false
            } else {
                *state = NavigationState::Idle;
                true
            }
        });
        if changed {
            info!("Navigation stopped");
        }
    }

    fn context(&self) -> MutexGuard<'_, SessionContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishing takes the context guard so that every state change is
    /// ordered with generation checks
    fn publish(&self, _ctx: &SessionContext, state: NavigationState) {
        debug!("Navigation state -> {}", state.label());
        self.state.send_replace(state);
    }

    async fn compute_initial_route(
        &self,
        generation: u64,
        origin: Point<f64>,
        destination: Point<f64>,
        destination_name: String,
    ) -> bool {
        info!("Computing route to {destination_name}");
        let route = self.provider.get_route(origin, destination, false).await;

        let mut ctx = self.context();
        if ctx.generation != generation {
            debug!("Discarding route to {destination_name} from a cancelled request");
            return false;
        }

        match route {
            Some(route) => {
                ctx.adopt_route();
                info!(
                    "Navigating to {destination_name}: {:.0} m, {} steps",
                    route.distance_m,
                    route.steps.len()
                );
                self.publish(
                    &ctx,
                    NavigationState::Active(ActiveNavigation::fresh(
                        Arc::new(route),
                        destination,
                        destination_name,
                    )),
                );
                true
            }
            None => {
                warn!("No walking route found to {destination_name}");
                self.publish(
                    &ctx,
                    NavigationState::Error {
                        message: format!("No walking route found to {destination_name}"),
                    },
                );
                false
            }
        }
    }

    /// Synchronous per-fix processing of an active walk
    fn track(
        &self,
        ctx: &mut SessionContext,
        active: ActiveNavigation,
        fix: &LocationFix,
    ) -> FixOutcome {
        let route: &WalkingRoute = &active.route;
        let hint = ctx.last_snap.map_or(0, |snap| snap.closest_index);
        let snap = self.snapper.snap(
            fix.position,
            &route.points,
            hint,
            &self.config.snap_search_radii,
        );
        ctx.last_snap = Some(snap);

        let remaining = remaining_distance(&snap, &route.points);
        let eta = remaining_time(remaining, route.distance_m, route.duration_s);
        let step = self.step_detector.current_step(&snap, route);

        if ctx.off_route.is_off_route(fix, &snap) {
            info!(
                "Walker is {:.0} m off the route to {} - rerouting",
                snap.distance_to_route_m, active.destination_name
            );
            return FixOutcome::Reroute {
                generation: ctx.generation,
                distance_to_route: snap.distance_to_route_m,
                active,
            };
        }

        if Haversine.distance(fix.position, active.destination) <= self.config.arrival_radius_m {
            info!("Arrived at {}", active.destination_name);
            ctx.reset_trackers();
            self.publish(
                ctx,
                NavigationState::Arrived {
                    destination_name: active.destination_name,
                },
            );
            return FixOutcome::Done;
        }

        trace!(
            "Step {} - {:.0} m to maneuver, {remaining:.0} m / {eta:.0} s left",
            step.step_index, step.distance_to_maneuver_m
        );
        self.publish(
            ctx,
            NavigationState::Active(ActiveNavigation {
                current_step_index: step.step_index,
                distance_to_next_maneuver: step.distance_to_maneuver_m,
                remaining_distance: remaining,
                eta_seconds: eta,
                is_off_route: false,
                closest_point_index: snap.closest_index,
                distance_to_route: snap.distance_to_route_m,
                ..active
            }),
        );
        FixOutcome::Done
    }

    /// Replaces the route after the walker strayed. On failure the previous
    /// route stays in place, flagged as off-route.
    async fn reroute(
        &self,
        generation: u64,
        active: ActiveNavigation,
        origin: Point<f64>,
        distance_to_route: Meters,
    ) {
        let route = self
            .provider
            .get_route(origin, active.destination, false)
            .await;

        let mut ctx = self.context();
        if ctx.generation != generation {
            debug!(
                "Discarding reroute to {} from a cancelled walk",
                active.destination_name
            );
            return;
        }

        match route {
            Some(route) => {
                ctx.adopt_route();
                info!(
                    "Rerouted to {}: {:.0} m",
                    active.destination_name, route.distance_m
                );
                self.publish(
                    &ctx,
                    NavigationState::Active(ActiveNavigation::fresh(
                        Arc::new(route),
                        active.destination,
                        active.destination_name,
                    )),
                );
            }
            None => {
                warn!(
                    "Reroute to {} failed - keeping the previous route",
                    active.destination_name
                );
                // A refresh may have landed while the reroute was pending
                let current = match self.state() {
                    NavigationState::Active(current) => current,
                    _ => active,
                };
                self.publish(
                    &ctx,
                    NavigationState::Active(ActiveNavigation {
                        is_off_route: true,
                        distance_to_route,
                        ..current
                    }),
                );
            }
        }
    }
}
