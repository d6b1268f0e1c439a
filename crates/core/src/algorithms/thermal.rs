//! Thermal spread model
//!
//! Heat is the propagating quantity. Each tick runs three phases over the
//! draft step:
//!
//! 1. combustion: every burning cell converts fuel into emitted energy at an
//!    Arrhenius rate damped by air humidity;
//! 2. energy transfer: the emitted energy splits between the cell and its
//!    neighbors by inverse-distance weights skewed by slope and wind;
//! 3. heat regulation: every cell cools toward air temperature through
//!    convection and radiation, integrated adaptively so no sub-step changes
//!    the temperature by more than 15 %.
//!
//! Phases 1 and 2 touch only the burning front; phase 3 touches every cell
//! and is embarrassingly parallel, so it runs on the rayon pool.

use rayon::prelude::*;

use crate::core_types::geo::Grid;
use crate::core_types::step::Step;
use crate::core_types::weather::Factors;
use crate::simulation::Simulation;

use super::Algorithm;

pub const DEFAULT_COMBUSTION_INTENSITY: f64 = 5000.0;
pub const DEFAULT_ENERGY_EMISSION: f64 = 16_500.0;
pub const DEFAULT_CONVECTION_INTENSITY: f64 = 0.000_17;
pub const DEFAULT_RADIATION_INTENSITY: f64 = 2.2e-14;
pub const DEFAULT_SCALE_EFFECT: f64 = 174.0;
/// 3.5 in some research.
pub const DEFAULT_AIR_HUMIDITY_EFFECT: f64 = 12.0;
pub const DEFAULT_SLOPE_EFFECT: f64 = 3.0;
/// 0.13 in some research.
pub const DEFAULT_WIND_EFFECT: f64 = 0.13;

const UNIVERSAL_GAS_CONSTANT: f64 = 8.3;
const CELSIUS_ZERO_TEMPERATURE: f64 = 273.0;

/// Largest relative temperature change one regulation sub-step may apply.
const HEAT_CHANGE_LIMIT: f64 = 0.15;

fn to_kelvin(celsius: f64) -> f64 {
    celsius + CELSIUS_ZERO_TEMPERATURE
}

fn to_celsius(kelvin: f64) -> f64 {
    kelvin - CELSIUS_ZERO_TEMPERATURE
}

/// Thermal model with tunable physical parameters.
///
/// The defaults are the calibrated values; [`ThermalAlgorithm::from_parameters`]
/// exists for calibration harnesses sweeping the parameter space.
#[derive(Debug, Clone)]
pub struct ThermalAlgorithm {
    combustion_intensity: f64,
    energy_emission: f64,
    convection_intensity: f64,
    radiation_intensity: f64,
    scale_effect: f64,
    air_humidity_effect: f64,
    slope_effect: f64,
    wind_effect: f64,
}

impl Default for ThermalAlgorithm {
    fn default() -> Self {
        ThermalAlgorithm {
            combustion_intensity: DEFAULT_COMBUSTION_INTENSITY,
            energy_emission: DEFAULT_ENERGY_EMISSION,
            convection_intensity: DEFAULT_CONVECTION_INTENSITY,
            radiation_intensity: DEFAULT_RADIATION_INTENSITY,
            scale_effect: DEFAULT_SCALE_EFFECT,
            air_humidity_effect: DEFAULT_AIR_HUMIDITY_EFFECT,
            slope_effect: DEFAULT_SLOPE_EFFECT,
            wind_effect: DEFAULT_WIND_EFFECT,
        }
    }
}

impl ThermalAlgorithm {
    /// Parameter order: combustion intensity, energy emission, convection
    /// intensity, radiation intensity, scale effect, air humidity effect,
    /// slope effect, wind effect.
    pub fn from_parameters(parameters: &[f64; 8]) -> Self {
        ThermalAlgorithm {
            combustion_intensity: parameters[0],
            energy_emission: parameters[1],
            convection_intensity: parameters[2],
            radiation_intensity: parameters[3],
            scale_effect: parameters[4],
            air_humidity_effect: parameters[5],
            slope_effect: parameters[6],
            wind_effect: parameters[7],
        }
    }

    fn burn_fuel(&self, draft: &mut Step, index: u32, step_seconds: f64, scale: i32) {
        let cell = &mut draft.cells_mut()[index as usize];
        let activation_energy = cell.factors().forest_type().activation_energy();
        let rate = self.combustion_rate(
            cell.state().heat(),
            cell.factors().air_humidity(),
            activation_energy,
        );
        let burned_fraction = (rate * step_seconds * f64::from(scale)).min(1.0);
        cell.emitted_energy = self.energy_emission * burned_fraction * cell.state().fuel();
        cell.state_mut().account_combustion(rate);
    }

    fn transfer_energy(&self, draft: &mut Step, index: u32, grid: &Grid) {
        let (emitted_energy, shares) = {
            let cell = draft.cell(index);
            let mut shares: Vec<(u32, f64)> = Vec::with_capacity(8);
            for ((offset_x, offset_y), neighbor_index) in cell.iter_neighbors() {
                let neighbor = draft.cell(neighbor_index);
                let distance = grid.offset_distance(cell.coordinates(), offset_x, offset_y);
                let elevation_rise = neighbor.factors().elevation() - cell.factors().elevation();
                let environmental_effect = self
                    .slope_influence(elevation_rise, grid.cell_height() * distance)
                    * self.wind_influence(cell.factors(), offset_x, offset_y);
                shares.push((neighbor_index, environmental_effect / distance));
            }
            (cell.emitted_energy, shares)
        };

        let self_weight = self.scale_effect / f64::from(grid.scale());
        let total_proximity: f64 =
            self_weight + shares.iter().map(|&(_, weight)| weight).sum::<f64>();

        let cells = draft.cells_mut();
        let state = cells[index as usize].state_mut();
        state.set_heat(state.heat() + emitted_energy * self_weight / total_proximity);
        for (neighbor_index, weight) in shares {
            let state = cells[neighbor_index as usize].state_mut();
            state.set_heat(state.heat() + emitted_energy * weight / total_proximity);
        }
    }

    /// Arrhenius combustion rate for a cell temperature (°C), air humidity
    /// in [0, 1] and activation energy (J/mol).
    pub(crate) fn combustion_rate(
        &self,
        heat: f64,
        air_humidity: f64,
        activation_energy: f64,
    ) -> f64 {
        let temperature = to_kelvin(heat);
        let fire_power = -activation_energy / UNIVERSAL_GAS_CONSTANT / temperature;
        let air_humidity_influence = (-self.air_humidity_effect * air_humidity).exp();
        air_humidity_influence * self.combustion_intensity * fire_power.exp()
    }

    /// Cools a cell temperature (°C) toward the air temperature over one
    /// tick. Explicit Euler with sub-steps sized so no iteration moves the
    /// absolute temperature by more than [`HEAT_CHANGE_LIMIT`]; the result
    /// never drops below 0 K.
    pub(crate) fn regulate_heat(&self, heat: f64, air_temperature: f64, step_seconds: f64) -> f64 {
        let mut heat = to_kelvin(heat);
        let air_temperature = to_kelvin(air_temperature);
        let mut phase = 0.0;
        while phase < 0.999 {
            let convection_rate = -self.convection_intensity * (heat - air_temperature);
            let radiation_rate = -self.radiation_intensity * heat.powi(4);
            let heat_change_rate = convection_rate + radiation_rate;
            let mut phase_fraction = 1.0;
            let mut heat_change = heat_change_rate * phase_fraction * step_seconds;
            if heat_change.abs() > heat * HEAT_CHANGE_LIMIT {
                heat_change = heat * HEAT_CHANGE_LIMIT * heat_change.signum();
                phase_fraction = heat_change / heat_change_rate / step_seconds;
            }
            if phase + phase_fraction > 1.0 {
                phase_fraction = 1.0 - phase;
                heat_change = heat_change_rate * phase_fraction * step_seconds;
            }
            phase += phase_fraction;
            heat += heat_change;
            if heat < 0.0 {
                heat = 0.0;
            }
        }
        to_celsius(heat)
    }

    fn slope_influence(&self, elevation_rise: f64, distance_meters: f64) -> f64 {
        if elevation_rise == 0.0 {
            return 1.0;
        }
        let slope = elevation_rise / distance_meters;
        (self.slope_effect * slope).exp()
    }

    /// Wind component along the offset direction, in m/s, fed through an
    /// exponential skew. Upwind neighbors get less than 1, downwind more.
    fn wind_influence(&self, factors: &Factors, offset_x: i32, offset_y: i32) -> f64 {
        let offset_x = f64::from(offset_x);
        let offset_y = f64::from(offset_y);
        let wind_along = (factors.wind_x() * offset_x + factors.wind_y() * offset_y)
            / offset_x.hypot(offset_y);
        (self.wind_effect * wind_along).exp()
    }
}

impl Algorithm for ThermalAlgorithm {
    fn refine_draft_step(&self, draft: &mut Step, simulation: &Simulation) {
        let step_seconds = simulation.timeline().step_duration().as_secs_f64();
        let grid = *simulation.grid();

        let burning_cells: Vec<u32> = (0..draft.cells().len() as u32)
            .filter(|&index| draft.cell(index).is_burning())
            .collect();

        for &index in &burning_cells {
            self.burn_fuel(draft, index, step_seconds, grid.scale());
        }
        for &index in &burning_cells {
            self.transfer_energy(draft, index, &grid);
        }
        draft.cells_mut().par_iter_mut().for_each(|cell| {
            let heat = self.regulate_heat(
                cell.state().heat(),
                cell.factors().air_temperature(),
                step_seconds,
            );
            cell.state_mut().set_heat(heat);
        });
    }
}
