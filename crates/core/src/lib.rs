//! Cellular Wildfire Simulation Core
//!
//! A cellular-automaton wildfire propagation engine on a global geographic
//! grid. Fire spreads over a growing graph of cells through physics-based
//! thermal diffusion (Arrhenius combustion, inverse-distance energy
//! transfer, adaptive heat regulation) or a lighter probabilistic-ignition
//! model, driven by pluggable terrain and weather services.
//!
//! ## Structure
//!
//! - [`core_types`] — grid geometry, compressed factors, cells, steps,
//!   timeline
//! - [`algorithms`] — the thermal and probabilistic spread models
//! - [`simulation`] — the simulation state machine and bounded registry
//! - [`services`] — terrain/weather collaborator contracts plus uniform
//!   test doubles

pub mod algorithms;
pub mod core_types;
pub mod services;
pub mod simulation;

// Re-export the data model
pub use core_types::{Cell, CellState, Coordinates, Grid, LatLng, Step, Timeline};
pub use core_types::{Factors, ForestType, Weather};

// Re-export the engine surface
pub use algorithms::{Algorithm, ProbabilisticAlgorithm, ThermalAlgorithm};
pub use services::{
    SlopedTerrainService, TerrainService, UniformTerrainService, UniformWeatherService,
    WeatherService,
};
pub use simulation::{Simulation, SimulationRegistry, Simulator};
