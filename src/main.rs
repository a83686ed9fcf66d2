//! paddock - walking guidance around a venue from the command line
//!
//! ```bash
//! paddock route --graph venue.json --from gate-a --to grandstand-b --preference coolest --temperature 33
//! paddock replay --graph venue.json --track walk.json --destination-lat 52.072 --destination-lon -1.015
//! ```
//!
//! Settings come from `--config` (a TOML file with `[navigation]` and
//! `[routing]` tables), then `paddock.toml` in the working directory if it
//! exists, then built-in defaults. Routing flags override the file.

mod config;
mod replay;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Parser, Subcommand, ValueEnum};
use geo::Point;
use geojson::FeatureCollection;
use paddock_core::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::PaddockConfig;
use replay::{Replay, load_track};

#[derive(Parser)]
#[command(name = "paddock", version)]
#[command(about = "Heat-aware walking routes and guidance for race venues")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the route between two graph nodes as GeoJSON
    Route {
        /// Venue graph JSON file
        #[arg(short, long)]
        graph: PathBuf,

        /// Start node id
        #[arg(long)]
        from: String,

        /// Target node id
        #[arg(long)]
        to: String,

        #[command(flatten)]
        conditions: ConditionArgs,
    },
    /// Replay a recorded track of fixes and log every navigation update
    Replay {
        /// Venue graph JSON file
        #[arg(short, long)]
        graph: PathBuf,

        /// Track JSON file: [{"lat", "lon", "accuracy"?, "t"}]
        #[arg(short, long)]
        track: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        destination_lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        destination_lon: f64,

        /// Display name of the destination
        #[arg(long, default_value = "destination")]
        name: String,

        /// Playback rate relative to the recording
        #[arg(long, default_value = "1.0")]
        speedup: f64,

        #[command(flatten)]
        conditions: ConditionArgs,
    },
}

/// Cost model selectable on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PreferenceArg {
    /// Shortest walking distance
    Fastest,
    /// Avoid sun-exposed hot surfaces above 28 °C
    Coolest,
}

impl From<PreferenceArg> for RoutePreference {
    fn from(arg: PreferenceArg) -> Self {
        match arg {
            PreferenceArg::Fastest => RoutePreference::Fastest,
            PreferenceArg::Coolest => RoutePreference::Coolest,
        }
    }
}

/// Overrides for the `[routing]` table
#[derive(clap::Args)]
struct ConditionArgs {
    /// Cost model
    #[arg(long, value_enum)]
    preference: Option<PreferenceArg>,

    /// Ambient temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f32>,
}

impl ConditionArgs {
    fn apply(&self, routing: &mut RoutingConfig) {
        if let Some(preference) = self.preference {
            routing.preference = preference.into();
        }
        if let Some(temperature) = self.temperature {
            routing.ambient_temperature_c = temperature;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Route {
            graph,
            from,
            to,
            conditions,
        } => {
            conditions.apply(&mut config.routing);
            run_route(&graph, &from, &to, &config.routing)?;
        }
        Command::Replay {
            graph,
            track,
            destination_lat,
            destination_lon,
            name,
            speedup,
            conditions,
        } => {
            conditions.apply(&mut config.routing);
            if !(speedup.is_finite() && speedup > 0.0) {
                return Err(Error::ConfigError(format!("Invalid speedup {speedup}")).into());
            }
            let replay = Replay {
                destination: Point::new(destination_lon, destination_lat),
                destination_name: name,
                speedup,
            };
            run_replay(&graph, &track, replay, config).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PaddockConfig, Error> {
    if let Some(path) = path {
        info!("Loading configuration from {}", path.display());
        return PaddockConfig::load(path);
    }
    let default_path = Path::new("paddock.toml");
    if default_path.exists() {
        info!("Loading configuration from paddock.toml");
        PaddockConfig::load(default_path)
    } else {
        info!("Using default configuration");
        Ok(PaddockConfig::default())
    }
}

fn run_route(
    graph_path: &Path,
    from: &str,
    to: &str,
    routing: &RoutingConfig,
) -> Result<(), Error> {
    let graph = load_walk_graph(graph_path)?;
    let route = route_between(
        &graph,
        from,
        to,
        routing.preference,
        routing.ambient_temperature_c,
    )?;

    if route.is_empty() {
        warn!("No walking path from {from} to {to}");
    } else {
        info!(
            edges = route.len(),
            distance_m = format_args!("{:.0}", route.total_distance_m()),
            preference = ?routing.preference,
            temperature_c = routing.ambient_temperature_c,
            "Route {from} -> {to}"
        );
    }

    let features = if route.is_empty() {
        Vec::new()
    } else {
        vec![route.to_geojson(&graph)?]
    };
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    println!("{}", serde_json::to_string_pretty(&collection)?);
    Ok(())
}

async fn run_replay(
    graph_path: &Path,
    track_path: &Path,
    replay: Replay,
    config: PaddockConfig,
) -> Result<(), Error> {
    let graph = Arc::new(load_walk_graph(graph_path)?);
    let track = load_track(track_path)?;
    info!(
        fixes = track.len(),
        destination = %replay.destination_name,
        "Replaying {}",
        track_path.display()
    );

    let provider = GraphRouteProvider::new(graph, config.routing);
    let session = Arc::new(NavigationSession::new(provider, config.navigation));

    tokio::select! {
        outcome = replay.run(Arc::clone(&session), &track) => {
            info!("Replay finished: {}", outcome.label());
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            session.stop();
        }
    }
    Ok(())
}
