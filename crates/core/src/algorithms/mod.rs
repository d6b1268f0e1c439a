//! Fire-spread physics
//!
//! An algorithm turns a draft step (carried state plus freshly grown
//! boundary cells, already wired to current factors) into the refined state
//! of its tick. Algorithms only mutate cell state; graph structure and
//! finality stay with the simulator.

pub mod probabilistic;
pub mod thermal;

use crate::core_types::step::Step;
use crate::simulation::Simulation;

pub use probabilistic::ProbabilisticAlgorithm;
pub use thermal::ThermalAlgorithm;

pub trait Algorithm: Send + Sync {
    fn refine_draft_step(&self, draft: &mut Step, simulation: &Simulation);
}
