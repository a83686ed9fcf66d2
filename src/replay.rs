//! Replays a recorded walk through a navigation session

use std::{path::Path, sync::Arc, time::Duration};

use geo::Point;
use paddock_core::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// One recorded location sample
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub accuracy: Option<f32>,
    /// Seconds since the start of the recording
    pub t: f64,
}

impl TrackPoint {
    fn fix(&self) -> LocationFix {
        let fix = LocationFix::new(self.lat, self.lon);
        match self.accuracy {
            Some(accuracy) => fix.with_accuracy(accuracy),
            None => fix,
        }
    }
}

pub fn load_track(path: &Path) -> Result<Vec<TrackPoint>, Error> {
    let content = std::fs::read_to_string(path)?;
    let mut track: Vec<TrackPoint> = serde_json::from_str(&content)?;
    if track.is_empty() {
        return Err(Error::InvalidData(format!(
            "Track {} has no fixes",
            path.display()
        )));
    }
    track.sort_by(|a, b| a.t.total_cmp(&b.t));
    Ok(track)
}

pub struct Replay {
    pub destination: Point<f64>,
    pub destination_name: String,
    /// Playback rate, 1.0 replays in real time
    pub speedup: f64,
}

impl Replay {
    /// Feeds the track into `session` and returns the final state
    pub async fn run(
        &self,
        session: Arc<NavigationSession<GraphRouteProvider>>,
        track: &[TrackPoint],
    ) -> NavigationState {
        let watcher = tokio::spawn(log_transitions(session.subscribe()));

        session
            .start(self.destination, self.destination_name.clone(), None)
            .await;

        let mut previous_t = track.first().map_or(0.0, |point| point.t);
        for point in track {
            let wait = (point.t - previous_t).max(0.0) / self.speedup;
            previous_t = point.t;
            if wait > 0.0 {
                tokio::time::sleep(Duration::from_secs_f64(wait)).await;
            }

            let fix = point.fix();
            debug!(lat = point.lat, lon = point.lon, t = point.t, "Replaying fix");
            session.update_location(fix).await;
            session.recalculate_if_stale(&fix).await;

            match session.state() {
                NavigationState::Arrived { .. } => break,
                NavigationState::Error { .. } => break,
                _ => {}
            }
        }

        let outcome = session.state();
        session.stop();
        watcher.abort();
        outcome
    }
}

async fn log_transitions(mut states: tokio::sync::watch::Receiver<NavigationState>) {
    let mut last_label = "";
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        match &state {
            NavigationState::Active(active) => {
                let label = state.label();
                if label != last_label {
                    info!(
                        destination = %active.destination_name,
                        distance_m = format_args!("{:.0}", active.route.distance_m),
                        "Navigation {label}"
                    );
                }
                let step = active
                    .current_step()
                    .map_or("Continue", |step| step.instruction());
                debug!(
                    step = active.current_step_index,
                    remaining_m = format_args!("{:.0}", active.remaining_distance),
                    eta_s = format_args!("{:.0}", active.eta_seconds),
                    off_route = active.is_off_route,
                    "{step} in {:.0} m",
                    active.distance_to_next_maneuver
                );
            }
            NavigationState::Error { message } => warn!("Navigation failed: {message}"),
            other => info!("Navigation {}", other.label()),
        }
        last_label = state.label();
    }
}
