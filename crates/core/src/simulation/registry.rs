//! Bounded registry of live simulations
//!
//! A server keeps at most `capacity` simulations in memory; inserting past
//! capacity evicts the least recently accessed one. Recency is a monotonic
//! stamp bumped on every find, not wall-clock time, so two accesses within
//! the same instant still order correctly.

use std::sync::Mutex;

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::simulation::Simulation;

pub const DEFAULT_CAPACITY: usize = 50;

struct Entry {
    simulation: Arc<Simulation>,
    last_access: u64,
}

struct Inner {
    entries: FxHashMap<Uuid, Entry>,
    access_counter: u64,
}

pub struct SimulationRegistry {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl Default for SimulationRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SimulationRegistry {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        SimulationRegistry {
            capacity,
            inner: Mutex::new(Inner {
                entries: FxHashMap::default(),
                access_counter: 0,
            }),
        }
    }

    /// Looks a simulation up and bumps its recency.
    pub fn find_simulation(&self, id: Uuid) -> Option<Arc<Simulation>> {
        let mut inner = self.lock();
        inner.access_counter += 1;
        let stamp = inner.access_counter;
        let entry = inner.entries.get_mut(&id)?;
        entry.last_access = stamp;
        Some(Arc::clone(&entry.simulation))
    }

    /// Inserts a simulation, evicting the least recently accessed entry if
    /// the registry is full.
    pub fn add_simulation(&self, simulation: Arc<Simulation>) {
        let mut inner = self.lock();
        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&simulation.id()) {
            let stalest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(&id, _)| id);
            if let Some(id) = stalest {
                inner.entries.remove(&id);
                debug!(%id, "evicted least recently accessed simulation");
            }
        }
        inner.access_counter += 1;
        let entry = Entry {
            simulation: Arc::clone(&simulation),
            last_access: inner.access_counter,
        };
        inner.entries.insert(simulation.id(), entry);
    }

    pub fn remove_simulation(&self, id: Uuid) {
        self.lock().entries.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("registry lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geo::{Coordinates, Grid};
    use crate::core_types::timeline::Timeline;
    use std::time::{Duration, UNIX_EPOCH};

    fn simulation() -> Arc<Simulation> {
        Arc::new(Simulation::new(
            Grid::new(1),
            Coordinates::new(0, 0),
            Timeline::new(
                UNIX_EPOCH,
                Duration::from_secs(1800),
                Duration::from_secs(86_400),
            ),
        ))
    }

    #[test]
    fn test_addition_and_lookup() {
        let registry = SimulationRegistry::default();
        let simulations: Vec<_> = (0..20).map(|_| simulation()).collect();
        for simulation in &simulations {
            registry.add_simulation(Arc::clone(simulation));
        }
        for simulation in &simulations {
            let found = registry.find_simulation(simulation.id());
            assert!(found.is_some_and(|found| found.id() == simulation.id()));
        }
    }

    #[test]
    fn test_removal() {
        let registry = SimulationRegistry::default();
        let simulations: Vec<_> = (0..20).map(|_| simulation()).collect();
        for simulation in &simulations {
            registry.add_simulation(Arc::clone(simulation));
        }
        for simulation in &simulations {
            registry.remove_simulation(simulation.id());
            assert!(registry.find_simulation(simulation.id()).is_none());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_simulation() {
        let registry = SimulationRegistry::default();
        registry.add_simulation(simulation());
        assert!(registry.find_simulation(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_eviction_at_capacity() {
        let registry = SimulationRegistry::new(3);
        let first = simulation();
        let rest: Vec<_> = (0..3).map(|_| simulation()).collect();

        registry.add_simulation(Arc::clone(&first));
        for simulation in &rest {
            registry.add_simulation(Arc::clone(simulation));
        }

        assert_eq!(registry.len(), 3);
        // The first, never looked up again, is the one evicted.
        assert!(registry.find_simulation(first.id()).is_none());
        for simulation in &rest {
            assert!(registry.find_simulation(simulation.id()).is_some());
        }
    }

    #[test]
    fn test_find_refreshes_recency() {
        let registry = SimulationRegistry::new(3);
        let simulations: Vec<_> = (0..3).map(|_| simulation()).collect();
        for simulation in &simulations {
            registry.add_simulation(Arc::clone(simulation));
        }

        // Touch the oldest; the next insert must evict the second instead.
        assert!(registry.find_simulation(simulations[0].id()).is_some());
        registry.add_simulation(simulation());

        assert!(registry.find_simulation(simulations[0].id()).is_some());
        assert!(registry.find_simulation(simulations[1].id()).is_none());
        assert!(registry.find_simulation(simulations[2].id()).is_some());
    }

    #[test]
    fn test_reinserting_same_simulation_does_not_evict() {
        let registry = SimulationRegistry::new(2);
        let first = simulation();
        let second = simulation();
        registry.add_simulation(Arc::clone(&first));
        registry.add_simulation(Arc::clone(&second));
        registry.add_simulation(Arc::clone(&first));

        assert_eq!(registry.len(), 2);
        assert!(registry.find_simulation(second.id()).is_some());
    }
}
