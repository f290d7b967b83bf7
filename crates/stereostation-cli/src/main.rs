//! stereostation CLI: station layout inspection and event simulation.

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::f64::consts::TAU;
use std::path::PathBuf;
use stereostation::{
    DetectionStation, NormalSampler, ReconstructionStats, StationConfig, TruthCluster,
    GHOST_LABEL_OFFSET,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

const SIMULATION_SCHEMA_V1: &str = "stereostation.simulation.v1";

#[derive(Parser)]
#[command(name = "stereostation")]
#[command(about = "Digitize and reconstruct hits in a 3x1D stereo strip/wire station")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the station layout.
    Info(CliConfigArgs),

    /// Print the sector containing a transverse point.
    Locate {
        #[command(flatten)]
        config: CliConfigArgs,

        /// Lab x coordinate.
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        /// Lab y coordinate.
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },

    /// Simulate events with random hits and write reconstructed clusters.
    Simulate(CliSimulateArgs),
}

#[derive(Debug, Clone, Args)]
struct CliConfigArgs {
    /// Station configuration (JSON, schema stereostation.config.v1).
    /// The built-in 12-sector station is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CliConfigArgs {
    fn load(&self) -> CliResult<StationConfig> {
        match &self.config {
            Some(path) => {
                tracing::info!("Loading station config: {}", path.display());
                StationConfig::from_json_file(path)
            }
            None => Ok(StationConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct CliSimulateArgs {
    #[command(flatten)]
    config: CliConfigArgs,

    /// Path to write per-event results (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Number of events to simulate.
    #[arg(long, default_value = "10")]
    events: usize,

    /// Background hits per event, uniform over the station annulus.
    /// Hits are labelled 0..N and the signal N, so N stays below the ghost
    /// label offset.
    #[arg(
        long,
        default_value = "20",
        value_parser = clap::value_parser!(u32).range(..i64::from(GHOST_LABEL_OFFSET))
    )]
    background: u32,

    /// Add one signal hit per event.
    #[arg(long)]
    signal: bool,

    /// Seed for hit generation and smearing.
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct SimulationOutput {
    schema: &'static str,
    config: StationConfig,
    seed: u64,
    events: Vec<EventOutput>,
}

#[derive(Debug, Serialize)]
struct EventOutput {
    event: usize,
    n_digitized: usize,
    stats: ReconstructionStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<TruthCluster>,
    signal_killed: bool,
    clusters: Vec<TruthCluster>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => run_info(&args),
        Commands::Locate { config, x, y } => run_locate(&config, x, y),
        Commands::Simulate(args) => run_simulate(&args),
    }
}

fn run_info(args: &CliConfigArgs) -> CliResult<()> {
    let station = DetectionStation::new(args.load()?)?;
    print!("{station}");
    println!("Total sectors: {}", station.sectors().len());
    Ok(())
}

fn run_locate(args: &CliConfigArgs, x: f64, y: f64) -> CliResult<()> {
    let station = DetectionStation::new(args.load()?)?;
    match station.locate_sector([x, y]) {
        Some(id) => {
            let n_rad = station.n_rad_segments();
            let frame = station.sectors()[id].frame();
            let local = frame.rotate_to_sector([x, y]);
            println!(
                "sector {} (angular {}, radial {}): local ({:.4}, {:.4}), phi0 {:.4}",
                id,
                id / n_rad,
                id % n_rad,
                local[0],
                local[1],
                frame.phi0()
            );
        }
        None => println!("({x}, {y}) is outside the station acceptance"),
    }
    Ok(())
}

fn run_simulate(args: &CliSimulateArgs) -> CliResult<()> {
    let config = args.config.load()?;
    let mut station = DetectionStation::new(config.clone())?;
    let radii = station.radii();
    let (r_min, r_max) = (radii[0], radii[radii.len() - 1]);
    let z = station.z();

    let mut hit_rng = StdRng::seed_from_u64(args.seed);
    let mut gauss = NormalSampler::new(StdRng::seed_from_u64(args.seed.wrapping_add(1)));

    let mut events = Vec::with_capacity(args.events);
    let mut totals = ReconstructionStats::default();
    for event in 0..args.events {
        station.sink_mut().clear();
        let mut n_digitized = 0usize;
        for label in 0..args.background as i32 {
            let p = sample_annulus(&mut hit_rng, r_min, r_max, z);
            if station.digitize(p, label, true, &mut gauss) {
                n_digitized += 1;
            }
        }
        if args.signal {
            let p = sample_annulus(&mut hit_rng, r_min, r_max, z);
            if station.digitize(p, args.background as i32, false, &mut gauss) {
                n_digitized += 1;
            }
        }

        let stats = station.reconstruct();
        totals.n_hits += stats.n_hits;
        totals.n_coincidences += stats.n_coincidences;
        totals.n_genuine += stats.n_genuine;
        totals.n_ghosts += stats.n_ghosts;
        totals.n_signal += stats.n_signal;

        let sink = station.sink();
        events.push(EventOutput {
            event,
            n_digitized,
            stats,
            signal: sink.signal,
            signal_killed: sink.signal_killed,
            clusters: sink.background.clone(),
        });
    }

    tracing::info!(
        "Simulated {} events: {} hits, {} coincidences ({} genuine, {} ghosts, {} signal)",
        args.events,
        totals.n_hits,
        totals.n_coincidences,
        totals.n_genuine,
        totals.n_ghosts,
        totals.n_signal
    );

    let output = SimulationOutput {
        schema: SIMULATION_SCHEMA_V1,
        config,
        seed: args.seed,
        events,
    };
    let json = serde_json::to_string_pretty(&output)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());
    Ok(())
}

/// Point uniform in area over the annulus `r_min ≤ r < r_max`.
fn sample_annulus(rng: &mut StdRng, r_min: f64, r_max: f64, z: f64) -> [f64; 3] {
    let r2 = rng.gen_range(r_min * r_min..r_max * r_max);
    let r = r2.sqrt();
    let phi = rng.gen_range(0.0..TAU);
    [r * phi.cos(), r * phi.sin(), z]
}
