//! Probabilistic spread model
//!
//! A lighter alternative to the thermal model: no energy bookkeeping, just
//! Bernoulli ignition trials along the fire front. A burning cell attempts
//! to ignite each flammable neighbor once, with a probability skewed by the
//! neighbor's fuel density, the wind alignment and the slope, then burns out
//! within the tick. Newly ignited cells are marked during the trial pass and
//! promoted afterwards, so a single tick cannot chain ignitions.

use rand::Rng;

use crate::core_types::geo::Grid;
use crate::core_types::step::Step;
use crate::core_types::weather::Factors;
use crate::simulation::Simulation;

use super::Algorithm;

/// Heat assigned to an ignited cell; doubles as the burning marker.
const IGNITION_HEAT: f64 = 1000.0;

const BASIC_PROBABILITY: f64 = 0.58 / 2.5;
const PROBABILITY_GAIN: f64 = 1.4;
const SLOPE_EFFECT: f64 = 0.078;
const WIND_SPEED_EFFECT: f64 = 0.045;
const WIND_COS_EFFECT: f64 = 0.131;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilisticAlgorithm;

impl ProbabilisticAlgorithm {
    fn apply_rules<R: Rng>(draft: &mut Step, index: u32, grid: &Grid, rng: &mut R) {
        let cell = draft.cell(index);
        if cell.state().fuel() == 0.0 || cell.state().heat() != IGNITION_HEAT {
            return;
        }

        let mut ignited: Vec<u32> = Vec::with_capacity(8);
        for ((offset_x, offset_y), neighbor_index) in cell.iter_neighbors() {
            let neighbor = draft.cell(neighbor_index);
            if neighbor.state().heat() == IGNITION_HEAT || neighbor.state().fuel() == 0.0 {
                continue;
            }
            let elevation_rise = neighbor.factors().elevation() - cell.factors().elevation();
            let distance =
                grid.cell_height() * grid.offset_distance(cell.coordinates(), offset_x, offset_y);
            let probability = BASIC_PROBABILITY
                * PROBABILITY_GAIN
                * (1.0 + Self::fuel_density_effect(neighbor.state().fuel()))
                * Self::wind_influence(cell.factors(), offset_x, offset_y)
                * Self::slope_influence(elevation_rise, distance);
            if rng.random::<f64>() < probability.min(1.0) {
                ignited.push(neighbor_index);
            }
        }

        for neighbor_index in ignited {
            draft.cells_mut()[neighbor_index as usize].emitted_energy = 1.0;
        }
        let cell = &mut draft.cells_mut()[index as usize];
        cell.state_mut().set_heat(0.0);
        cell.state_mut().extinguish();
    }

    /// Denser fuel beds spread better; sparse ones suppress ignition
    /// entirely below 0.2.
    pub(crate) fn fuel_density_effect(fuel: f64) -> f64 {
        if fuel > 0.7 {
            0.3
        } else if fuel > 0.45 {
            0.0
        } else if fuel > 0.2 {
            -0.3
        } else {
            -1.0
        }
    }

    pub(crate) fn slope_influence(elevation_rise: f64, distance_meters: f64) -> f64 {
        if elevation_rise == 0.0 {
            return 1.0;
        }
        (SLOPE_EFFECT * elevation_rise / distance_meters).exp()
    }

    pub(crate) fn wind_influence(factors: &Factors, offset_x: i32, offset_y: i32) -> f64 {
        let wind_speed = factors.weather().wind_speed();
        if wind_speed == 0.0 {
            return 1.0;
        }
        let offset_x = f64::from(offset_x);
        let offset_y = f64::from(offset_y);
        let wind_cos = (factors.wind_x() * offset_x + factors.wind_y() * offset_y)
            / wind_speed
            / offset_x.hypot(offset_y);
        (wind_speed * (WIND_SPEED_EFFECT + WIND_COS_EFFECT * wind_cos)).exp()
    }
}

impl Algorithm for ProbabilisticAlgorithm {
    fn refine_draft_step(&self, draft: &mut Step, simulation: &Simulation) {
        let grid = *simulation.grid();
        let mut rng = rand::rng();

        for cell in draft.cells_mut() {
            cell.emitted_energy = 0.0;
        }
        for index in 0..draft.cells().len() as u32 {
            Self::apply_rules(draft, index, &grid, &mut rng);
        }
        for cell in draft.cells_mut() {
            if cell.emitted_energy > 0.0 {
                cell.state_mut().set_heat(IGNITION_HEAT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::weather::{ForestType, Weather};
    use approx::assert_relative_eq;

    fn factors(wind_x: f64, wind_y: f64) -> Factors {
        Factors::new(
            0.0,
            ForestType::Mixed,
            Weather::new(20.0, 0.3, wind_x, wind_y),
        )
    }

    #[test]
    fn test_fuel_density_effect_tiers() {
        assert_eq!(ProbabilisticAlgorithm::fuel_density_effect(0.9), 0.3);
        assert_eq!(ProbabilisticAlgorithm::fuel_density_effect(0.5), 0.0);
        assert_eq!(ProbabilisticAlgorithm::fuel_density_effect(0.3), -0.3);
        assert_eq!(ProbabilisticAlgorithm::fuel_density_effect(0.1), -1.0);
    }

    #[test]
    fn test_sparse_fuel_blocks_ignition() {
        // Effect -1 zeroes the probability regardless of wind and slope.
        let effect = 1.0 + ProbabilisticAlgorithm::fuel_density_effect(0.05);
        assert_eq!(effect, 0.0);
    }

    #[test]
    fn test_wind_influence_against_reference_values() {
        let factors = factors(3.0, 0.0);
        assert_relative_eq!(
            ProbabilisticAlgorithm::wind_influence(&factors, 1, 0),
            1.695_537_839_601_82,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            ProbabilisticAlgorithm::wind_influence(&factors, -1, 0),
            0.772_595_232_106_928,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_calm_wind_is_neutral() {
        let calm = factors(0.0, 0.0);
        assert_eq!(ProbabilisticAlgorithm::wind_influence(&calm, 1, 1), 1.0);
    }

    #[test]
    fn test_slope_influence_favors_uphill() {
        assert_eq!(ProbabilisticAlgorithm::slope_influence(0.0, 200.0), 1.0);
        assert!(ProbabilisticAlgorithm::slope_influence(80.0, 200.0) > 1.0);
        assert!(ProbabilisticAlgorithm::slope_influence(-80.0, 200.0) < 1.0);
    }
}
