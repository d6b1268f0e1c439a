//! Structural tests for step construction
//!
//! These tests exercise the simulator's cell-graph mechanics: seed creation,
//! boundary growth, neighbor wiring across the antimeridian and the poles,
//! and the tick limit. Physics only needs to keep the front burning here, so
//! every scenario uses a dense uniform fuel bed with dry, hot air.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use cellfire_core::{
    ForestType, Grid, LatLng, Simulation, Simulator, SlopedTerrainService, TerrainService,
    Timeline, UniformTerrainService, UniformWeatherService,
};

fn simulator(fuel: f64) -> Simulator {
    Simulator::new(
        Arc::new(UniformTerrainService::new(ForestType::Mixed, fuel, 0.0)),
        Arc::new(UniformWeatherService::new(200.0, 0.0, 0.0, 0.0)),
    )
}

#[test]
fn test_simulation_steps_are_appended_up_to_target_tick() {
    let simulator = simulator(1.0);
    let simulation = simulator.create_simulation(LatLng::new(0.0, 0.0));
    assert_eq!(simulation.step_count(), 0);

    assert!(simulator.try_start_simulation(&simulation));
    assert_eq!(simulation.step_count(), 1);

    assert!(simulator.try_progress_simulation(&simulation, 4));
    assert_eq!(simulation.step_count(), 5);

    assert!(simulator.try_progress_simulation(&simulation, 6));
    assert_eq!(simulation.step_count(), 7);
}

#[test]
fn test_domain_grows_around_the_burning_front() {
    // Start one cell off the antimeridian so growth has to wrap longitude.
    let simulator = simulator(1.0);
    let simulation = simulator.create_simulation(LatLng::new(0.0, -180.0 + 0.00001));

    assert!(simulator.try_start_simulation(&simulation));
    assert!(simulator.try_progress_simulation(&simulation, 2));

    let steps = simulation.read_steps();
    assert_eq!(steps[0].cells().len(), 1);
    assert_eq!(steps[1].cells().len(), 9);
    assert_eq!(steps[2].cells().len(), 25);

    // Every link is bidirectional, points at the geometric neighbor, and
    // never at the cell itself.
    let grid = simulation.grid();
    for (index, cell) in steps[2].cells().iter().enumerate() {
        for ((offset_x, offset_y), neighbor_index) in cell.iter_neighbors() {
            assert_ne!(neighbor_index as usize, index);

            let neighbor = steps[2].cell(neighbor_index);
            assert_ne!(neighbor.coordinates(), cell.coordinates());
            assert_eq!(
                neighbor.coordinates(),
                grid.neighbor(cell.coordinates(), offset_x, offset_y)
            );
            assert_eq!(
                neighbor.neighbor(-offset_x, -offset_y),
                Some(index as u32),
                "link must be symmetric"
            );
        }
    }
}

#[test]
fn test_fire_does_not_spread_through_the_pole() {
    let simulator = simulator(1.0);
    let simulation = simulator.create_simulation(LatLng::new(-90.0 + 0.00001, 0.0));

    assert!(simulator.try_start_simulation(&simulation));
    assert!(simulator.try_progress_simulation(&simulation, 1));

    let steps = simulation.read_steps();
    // Three southern neighbors would reflect across the pole; they are not
    // materialized, leaving the seed plus five cells.
    assert_eq!(steps[1].cells().len(), 6);
    for cell in steps[1].cells() {
        assert!((-1..=1).contains(&cell.coordinates().x));
    }
}

#[test]
fn test_simulation_without_fuel_is_final_at_the_seed() {
    let simulator = simulator(0.0);
    let simulation = simulator.create_simulation(LatLng::new(0.0, 0.0));

    assert!(simulator.try_start_simulation(&simulation));
    assert!(simulator.try_progress_simulation(&simulation, 10));

    assert_eq!(simulation.step_count(), 1);
    assert!(simulation.is_final());
    assert_eq!(simulation.read_steps()[0].cells().len(), 1);
}

#[test]
fn test_insignificant_fuel_counts_as_none() {
    let simulator = simulator(0.009);
    let simulation = simulator.create_simulation(LatLng::new(0.0, 0.0));

    assert!(simulator.try_start_simulation(&simulation));
    let steps = simulation.read_steps();
    assert_eq!(steps[0].cells()[0].state().fuel(), 0.0);
    assert!(steps[0].is_final());
}

#[test]
fn test_tick_limit_caps_step_count() {
    let simulator = simulator(1.0);
    let step_duration = Duration::from_secs(30 * 60);

    let four_hours = Duration::from_secs(4 * 3600);
    let simulation = custom_simulation(step_duration, four_hours);
    assert!(simulator.try_start_simulation(&simulation));
    assert!(simulator.try_progress_simulation(&simulation, 3));
    assert_eq!(simulation.step_count(), 1 + 3);
    assert!(simulator.try_progress_simulation(&simulation, 100_000));
    assert_eq!(simulation.step_count(), 1 + 2 * 4);

    // A limit that is not a whole multiple of the step rounds down.
    let limit = four_hours + Duration::from_secs(29 * 60);
    let simulation = custom_simulation(step_duration, limit);
    assert!(simulator.try_start_simulation(&simulation));
    assert!(simulator.try_progress_simulation(&simulation, 100_000));
    assert_eq!(simulation.step_count(), 1 + 2 * 4);
}

#[test]
fn test_sloped_terrain_service_feeds_elevation_into_factors() {
    let terrain = SlopedTerrainService::new(ForestType::Mixed, 1.0, 30.0, 0.0);
    let south = terrain.elevation(LatLng::new(0.0, 0.0));
    let north = terrain.elevation(LatLng::new(0.01, 0.0));
    assert!(north > south);
}

fn custom_simulation(step_duration: Duration, limit_duration: Duration) -> Arc<Simulation> {
    let grid = Grid::new(200);
    let start = grid.coordinates_of(LatLng::new(0.0, 0.0));
    Arc::new(Simulation::new(
        grid,
        start,
        Timeline::new(SystemTime::now(), step_duration, limit_duration),
    ))
}
