use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cellfire_core::{
    ForestType, LatLng, ProbabilisticAlgorithm, SimulationRegistry, Simulator,
    UniformTerrainService, UniformWeatherService,
};

/// Wildfire simulation demo over a uniform fuel bed
#[derive(Parser, Debug)]
#[command(name = "cellfire-demo")]
#[command(about = "Cellular wildfire simulation demo", long_about = None)]
struct Args {
    /// Ignition latitude in degrees
    #[arg(long, default_value_t = -33.8, allow_negative_numbers = true)]
    latitude: f64,

    /// Ignition longitude in degrees
    #[arg(long, default_value_t = 151.2, allow_negative_numbers = true)]
    longitude: f64,

    /// Uniform fuel load (0-1)
    #[arg(short, long, default_value_t = 0.5)]
    fuel: f64,

    /// Forest type code (0=treeless .. 5=mixed)
    #[arg(long, default_value_t = 5)]
    forest_code: u8,

    /// Air temperature in °C
    #[arg(short, long, default_value_t = 30.0, allow_negative_numbers = true)]
    temperature: f64,

    /// Relative air humidity (0-1)
    #[arg(long, default_value_t = 0.3)]
    humidity: f64,

    /// Eastward wind component in m/s
    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    wind_x: f64,

    /// Northward wind component in m/s
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    wind_y: f64,

    /// Number of ticks to simulate (30 simulated minutes each)
    #[arg(long, default_value_t = 48)]
    ticks: usize,

    /// Use the probabilistic-ignition model instead of the thermal one
    #[arg(short, long)]
    probabilistic: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("=== Cellular Wildfire Demo ===\n");

    let terrain = Arc::new(UniformTerrainService::new(
        ForestType::from_code(args.forest_code),
        args.fuel,
        0.0,
    ));
    let weather = Arc::new(UniformWeatherService::new(
        args.temperature,
        args.humidity,
        args.wind_x,
        args.wind_y,
    ));
    let simulator = if args.probabilistic {
        Simulator::with_algorithm(terrain, weather, Box::new(ProbabilisticAlgorithm))
    } else {
        Simulator::new(terrain, weather)
    };

    let registry = SimulationRegistry::default();
    let simulation = simulator.create_simulation(LatLng::new(args.latitude, args.longitude));
    registry.add_simulation(Arc::clone(&simulation));
    println!("Simulation {} at ({}, {})", simulation.id(), args.latitude, args.longitude);

    if !simulator.try_start_simulation(&simulation) {
        eprintln!("weather data unavailable for the ignition point");
        std::process::exit(1);
    }

    for tick in 1..=args.ticks {
        if !simulator.try_progress_simulation(&simulation, tick) {
            println!("weather data ran out at tick {tick}");
            break;
        }
        let steps = simulation.read_steps();
        let Some(step) = steps.get(tick) else { break };
        let max_heat = step
            .cells()
            .iter()
            .map(|cell| cell.state().heat())
            .fold(f64::MIN, f64::max);
        println!(
            "tick {tick:>3}: {:>6} cells, {:>6} damaged, max heat {max_heat:>7.1} °C{}",
            step.cells().len(),
            step.count_damaged_cells(),
            if step.is_final() { "  [final]" } else { "" },
        );
        if step.is_final() {
            break;
        }
    }

    let last = simulation.step_count() - 1;
    let steps = simulation.read_steps();
    println!(
        "\nFinished after {} ticks: {} cells touched, {} damaged",
        last,
        steps[last].cells().len(),
        steps[last].count_damaged_cells(),
    );
}
