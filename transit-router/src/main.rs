use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use transit_router::domain::{Network, StationId, format_duration};
use transit_router::network::JsonNetworkSource;
use transit_router::planner::{Route, RoutingConfig};
use transit_router::routing::{RoutingListener, RoutingState};

/// Find the fastest routes between two stations of a transit network.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the network files
    network_dir: PathBuf,

    /// Network files to load, one transport each
    #[arg(required = true)]
    files: Vec<String>,

    /// Origin station, as transport/line/station
    #[arg(long)]
    from: StationId,

    /// Destination station, as transport/line/station
    #[arg(long)]
    to: StationId,

    /// Station to avoid (repeatable)
    #[arg(long)]
    block: Vec<StationId>,

    /// Maximum number of alternatives besides the best route
    #[arg(long, default_value_t = 3)]
    alternatives: usize,
}

/// Reports how much of the network the search covered.
#[derive(Default)]
struct ProgressReporter {
    settled: usize,
}

impl RoutingListener for ProgressReporter {
    fn on_computing_times_started(&mut self) {
        self.settled = 0;
    }

    fn on_computing_times_progress(&mut self, stations: &[StationId], _times: &[chrono::Duration]) {
        self.settled += stations.len();
    }

    fn on_computing_times_finished(&mut self) {
        eprintln!("Reached {} stations", self.settled);
    }
}

fn station_label(network: &Network, station: &StationId) -> String {
    let name = network.station_name(station).unwrap_or("?");
    let transport = network
        .transports()
        .get(station.transport)
        .map(|t| t.name.as_str())
        .unwrap_or("?");
    let line = network
        .line(station.transport, station.line)
        .map(|l| l.name())
        .unwrap_or("?");
    format!("{name} ({transport} {line})")
}

fn print_route(network: &Network, rank: usize, route: &Route) {
    let heading = if rank == 0 {
        "Best route".to_string()
    } else {
        format!("Alternative {rank}")
    };
    println!(
        "{heading}: {} with {} transfer(s)",
        format_duration(route.total_time()),
        route.transfer_count()
    );
    for (station, arrival) in route.stations().iter().zip(route.arrivals()) {
        println!(
            "  {:>6}  {}",
            format_duration(*arrival),
            station_label(network, station)
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let source = JsonNetworkSource::new(&args.network_dir);
    let names: Vec<&str> = args.files.iter().map(String::as_str).collect();
    let config = RoutingConfig::new(args.alternatives, RoutingConfig::default().progress_batch_size);
    let mut state = RoutingState::from_source(&source, &names, config)?;
    eprintln!(
        "Loaded {} transports, {} stations",
        state.network().transport_count(),
        state.network().station_count()
    );

    let all: Vec<usize> = (0..state.network().transport_count()).collect();
    state.set_active(&all)?;
    state.add_listener(Box::new(ProgressReporter::default()));

    for station in &args.block {
        state.block_station(*station)?;
    }
    state.set_start(Some(args.from))?;
    state.set_end(Some(args.to))?;
    state.wait_idle().await;

    let network = state.network().clone();
    match state.routes() {
        Some(routes) if !routes.is_empty() => {
            for (rank, route) in routes.routes().iter().enumerate() {
                print_route(&network, rank, route);
            }
        }
        _ => println!(
            "No route from {} to {}",
            station_label(&network, &args.from),
            station_label(&network, &args.to)
        ),
    }

    Ok(())
}
