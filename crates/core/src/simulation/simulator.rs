//! Tick state machine
//!
//! The simulator owns the orchestration of one tick: build the draft step
//! from the last one (carrying state forward, refreshing factors, growing
//! the domain around the burning front), hand it to the algorithm, clamp
//! insignificant fuel remainders, append, detect finality. All terrain and
//! weather data flows in through the service traits.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::algorithms::{Algorithm, ThermalAlgorithm};
use crate::core_types::cell::{Cell, CellState, NEIGHBOR_OFFSETS};
use crate::core_types::geo::{Coordinates, Grid, LatLng};
use crate::core_types::step::Step;
use crate::core_types::timeline::Timeline;
use crate::core_types::weather::Factors;
use crate::services::{TerrainService, WeatherService};
use crate::simulation::Simulation;

const DEFAULT_GRID_SCALE: i32 = 200;
const DEFAULT_STEP_DURATION: Duration = Duration::from_secs(30 * 60);
const DEFAULT_LIMIT_DURATION: Duration = Duration::from_secs(7 * 24 * 3600);

/// Temperature assigned to the ignition cell (°C).
const INITIAL_HEAT: f64 = 1000.0;

/// Fuel loads below this threshold read as no fuel at all.
const SIGNIFICANT_FUEL: f64 = 0.01;

/// A required weather or terrain lookup had no data. Transient; never
/// crosses the public simulator boundary.
pub(crate) struct DataUnavailable;

pub struct Simulator {
    terrain_service: Arc<dyn TerrainService>,
    weather_service: Arc<dyn WeatherService>,
    algorithm: Box<dyn Algorithm>,
    tick_budget: Option<Duration>,
}

impl Simulator {
    pub fn new(
        terrain_service: Arc<dyn TerrainService>,
        weather_service: Arc<dyn WeatherService>,
    ) -> Self {
        Self::with_algorithm(
            terrain_service,
            weather_service,
            Box::new(ThermalAlgorithm::default()),
        )
    }

    pub fn with_algorithm(
        terrain_service: Arc<dyn TerrainService>,
        weather_service: Arc<dyn WeatherService>,
        algorithm: Box<dyn Algorithm>,
    ) -> Self {
        Simulator {
            terrain_service,
            weather_service,
            algorithm,
            tick_budget: None,
        }
    }

    /// Caps the wall-clock time one `try_progress_simulation` call may
    /// spend. Checked between ticks, never inside one; on expiry the
    /// simulation is finalized at the last complete step.
    #[must_use]
    pub fn with_tick_budget(mut self, budget: Duration) -> Self {
        self.tick_budget = Some(budget);
        self
    }

    pub fn create_simulation(&self, start_point: LatLng) -> Arc<Simulation> {
        let grid = Grid::new(DEFAULT_GRID_SCALE);
        let start_coordinates = grid.coordinates_of(start_point);
        let timeline = Timeline::new(
            SystemTime::now(),
            DEFAULT_STEP_DURATION,
            DEFAULT_LIMIT_DURATION,
        );
        let simulation = Arc::new(Simulation::new(grid, start_coordinates, timeline));
        info!(
            id = %simulation.id(),
            x = start_coordinates.x,
            y = start_coordinates.y,
            "simulation created"
        );
        simulation
    }

    /// Materializes the seed step. Returns false only when the weather
    /// lookup for the ignition point fails; the seed step is marked final
    /// right away when the ignition point cannot burn.
    pub fn try_start_simulation(&self, simulation: &Simulation) -> bool {
        let start_coordinates = simulation.start_coordinates();
        let start_point = simulation.grid().point_of(start_coordinates);

        let Ok(factors) = self.determine_factors(start_point, simulation.timeline().start()) else {
            warn!(id = %simulation.id(), "weather unavailable for ignition point");
            return false;
        };
        let fuel = self.determine_fuel(start_point);
        let cell = Cell::new(start_coordinates, CellState::new(INITIAL_HEAT, fuel), factors);

        let mut seed_step = Step::new();
        if !cell.is_burning() {
            seed_step.mark_final();
        }
        seed_step.push_cell(cell);
        simulation.push_step(seed_step);
        info!(id = %simulation.id(), is_final = simulation.is_final(), "simulation seeded");
        true
    }

    /// Advances the simulation until `target_tick` exists, the simulation
    /// turns final, or the tick limit is reached. Progression of one
    /// simulation is serialized; different simulations advance
    /// independently. Returns false only on data unavailability, after
    /// finalizing the simulation at its last complete step.
    pub fn try_progress_simulation(&self, simulation: &Simulation, target_tick: usize) -> bool {
        let _guard = simulation.lock_progress();
        let started = Instant::now();
        let limit_ticks = simulation.timeline().limit_ticks() as usize;

        while !simulation.has_step(target_tick)
            && !simulation.is_final()
            && simulation.step_count() <= limit_ticks
        {
            if let Some(budget) = self.tick_budget {
                if started.elapsed() > budget {
                    warn!(id = %simulation.id(), "tick budget exhausted, finalizing");
                    simulation.mark_last_step_final();
                    break;
                }
            }
            let mut draft = match self.create_draft_step(simulation) {
                Ok(draft) => draft,
                Err(DataUnavailable) => {
                    warn!(id = %simulation.id(), "weather unavailable, finalizing");
                    simulation.mark_last_step_final();
                    return false;
                }
            };
            self.algorithm.refine_draft_step(&mut draft, simulation);
            for cell in draft.cells_mut() {
                let fuel = cell.state().fuel();
                if fuel > 0.0 && fuel < SIGNIFICANT_FUEL {
                    cell.state_mut().extinguish();
                }
            }
            let is_final = !draft.has_burning_cells();
            debug!(
                id = %simulation.id(),
                tick = simulation.step_count(),
                cells = draft.cells().len(),
                damaged = draft.count_damaged_cells(),
                "tick complete"
            );
            simulation.push_step(draft);
            if is_final {
                simulation.mark_last_step_final();
            }
        }
        true
    }

    /// Next tick's cell graph before physics: carried cells keep their
    /// arena indices (so neighbor tables copy verbatim), factors are
    /// refreshed for the tick's instant, and the domain grows by
    /// materializing every absent neighbor of a burning cell.
    fn create_draft_step(&self, simulation: &Simulation) -> Result<Step, DataUnavailable> {
        let grid = *simulation.grid();
        let (carried_cells, tick) = {
            let steps = simulation.read_steps();
            let last_step = steps.last().expect("draft step requires a seed step");
            (last_step.cells().to_vec(), steps.len() as u32)
        };
        let date = simulation.timeline().tick_time(tick);

        let mut draft = Step::new();
        let mut cell_index: FxHashMap<Coordinates, u32> = FxHashMap::default();
        for cell in &carried_cells {
            let factors = self.determine_factors(grid.point_of(cell.coordinates()), date)?;
            let mut draft_cell = Cell::new(cell.coordinates(), *cell.state(), factors);
            draft_cell.neighbors = cell.neighbors;
            cell_index.insert(cell.coordinates(), draft.push_cell(draft_cell));
        }
        let carried_count = carried_cells.len() as u32;
        drop(carried_cells);

        for index in 0..carried_count {
            let (coordinates, grows) = {
                let cell = draft.cell(index);
                (
                    cell.coordinates(),
                    cell.state().fuel() > 0.0 && cell.is_burning(),
                )
            };
            if !grows {
                continue;
            }
            for (offset_x, offset_y) in NEIGHBOR_OFFSETS {
                if draft.cell(index).neighbor(offset_x, offset_y).is_some() {
                    continue;
                }
                let neighbor_coordinates = grid.neighbor(coordinates, offset_x, offset_y);
                if neighbor_coordinates.y == coordinates.y && offset_y != 0 {
                    // Fire does not spread through the poles.
                    continue;
                }
                if let Some(&existing) = cell_index.get(&neighbor_coordinates) {
                    let cells = draft.cells_mut();
                    cells[index as usize].set_neighbor(offset_x, offset_y, existing);
                    cells[existing as usize].set_neighbor(-offset_x, -offset_y, index);
                    continue;
                }
                let neighbor_point = grid.point_of(neighbor_coordinates);
                let fuel = self.determine_fuel(neighbor_point);
                let factors = self.determine_factors(neighbor_point, date)?;
                let state = CellState::new(factors.air_temperature(), fuel);
                let neighbor_index =
                    draft.push_cell(Cell::new(neighbor_coordinates, state, factors));
                for (delta_x, delta_y) in NEIGHBOR_OFFSETS {
                    let other_coordinates = grid.neighbor(neighbor_coordinates, delta_x, delta_y);
                    if let Some(&other_index) = cell_index.get(&other_coordinates) {
                        let cells = draft.cells_mut();
                        cells[neighbor_index as usize].set_neighbor(delta_x, delta_y, other_index);
                        cells[other_index as usize].set_neighbor(
                            -delta_x,
                            -delta_y,
                            neighbor_index,
                        );
                    }
                }
                cell_index.insert(neighbor_coordinates, neighbor_index);
            }
        }
        Ok(draft)
    }

    fn determine_factors(
        &self,
        point: LatLng,
        time: SystemTime,
    ) -> Result<Factors, DataUnavailable> {
        let weather = self
            .weather_service
            .weather(point, time)
            .ok_or(DataUnavailable)?;
        Ok(Factors::new(
            self.terrain_service.elevation(point),
            self.terrain_service.forest_type(point),
            weather,
        ))
    }

    fn determine_fuel(&self, point: LatLng) -> f64 {
        let fuel = self.terrain_service.fuel(point);
        if fuel < SIGNIFICANT_FUEL {
            0.0
        } else {
            fuel
        }
    }
}
