//! Simulation state and orchestration
//!
//! A [`Simulation`] owns the append-only list of per-tick steps; the
//! [`Simulator`](simulator::Simulator) advances it; the
//! [`SimulationRegistry`](registry::SimulationRegistry) holds the live set
//! a server is allowed to keep in memory.

pub mod registry;
pub mod simulator;

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::core_types::geo::{Coordinates, Grid};
use crate::core_types::step::Step;
use crate::core_types::timeline::Timeline;

pub use registry::SimulationRegistry;
pub use simulator::Simulator;

/// One wildfire simulation: immutable setup plus the growing step list.
///
/// Steps are strictly append-only. Readers may walk existing steps while a
/// progression appends new ones; the cells of an appended step are never
/// mutated again. Progression itself is serialized through `progress_lock`,
/// because draft-step construction mutates shared per-cell link state and
/// must never run twice concurrently for the same simulation.
pub struct Simulation {
    id: Uuid,
    grid: Grid,
    start_coordinates: Coordinates,
    timeline: Timeline,
    steps: RwLock<Vec<Step>>,
    progress_lock: Mutex<()>,
}

impl Simulation {
    pub fn new(grid: Grid, start_coordinates: Coordinates, timeline: Timeline) -> Self {
        Simulation {
            id: Uuid::new_v4(),
            grid,
            start_coordinates,
            timeline,
            steps: RwLock::new(Vec::new()),
            progress_lock: Mutex::new(()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Cell coordinates of the ignition point.
    pub fn start_coordinates(&self) -> Coordinates {
        self.start_coordinates
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn step_count(&self) -> usize {
        self.read_steps().len()
    }

    /// Whether the step for the given tick already exists.
    pub fn has_step(&self, tick: usize) -> bool {
        tick < self.step_count()
    }

    /// Whether the last step is final (or no step exists yet).
    pub fn is_final(&self) -> bool {
        self.read_steps().last().is_none_or(Step::is_final)
    }

    /// Snapshot of the requested tick range, clamped to the existing steps.
    /// Suitable for direct serialization to a client.
    pub fn slice_steps(&self, start_tick: usize, end_tick: usize) -> Vec<Step> {
        let steps = self.read_steps();
        if start_tick >= steps.len() {
            return Vec::new();
        }
        let end = end_tick.min(steps.len().saturating_sub(1));
        steps[start_tick..=end].to_vec()
    }

    /// Read access to the whole step list. The guard blocks appends, not
    /// other readers; hold it briefly.
    pub fn read_steps(&self) -> RwLockReadGuard<'_, Vec<Step>> {
        self.steps.read().expect("simulation steps lock poisoned")
    }

    pub(crate) fn push_step(&self, step: Step) {
        self.steps
            .write()
            .expect("simulation steps lock poisoned")
            .push(step);
    }

    pub(crate) fn mark_last_step_final(&self) {
        if let Some(step) = self
            .steps
            .write()
            .expect("simulation steps lock poisoned")
            .last_mut()
        {
            step.mark_final();
        }
    }

    pub(crate) fn lock_progress(&self) -> MutexGuard<'_, ()> {
        self.progress_lock
            .lock()
            .expect("simulation progress lock poisoned")
    }
}

impl Serialize for Simulation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let steps = self.read_steps();
        let mut state = serializer.serialize_struct("Simulation", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("grid", &self.grid)?;
        state.serialize_field("startCoordinates", &self.start_coordinates)?;
        state.serialize_field("timeline", &self.timeline)?;
        state.serialize_field("steps", &*steps)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn simulation() -> Simulation {
        let grid = Grid::new(200);
        Simulation::new(
            grid,
            Coordinates::new(0, 0),
            Timeline::new(
                UNIX_EPOCH,
                Duration::from_secs(1800),
                Duration::from_secs(86_400),
            ),
        )
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(simulation().id(), simulation().id());
    }

    #[test]
    fn test_empty_simulation_counts_as_final() {
        let simulation = simulation();
        assert!(simulation.is_final());
        assert!(!simulation.has_step(0));
    }

    #[test]
    fn test_slice_clamps_to_existing_steps() {
        let simulation = simulation();
        simulation.push_step(Step::new());
        simulation.push_step(Step::new());

        assert_eq!(simulation.slice_steps(0, 10).len(), 2);
        assert_eq!(simulation.slice_steps(1, 1).len(), 1);
        assert!(simulation.slice_steps(5, 10).is_empty());
    }
}
