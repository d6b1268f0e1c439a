//! Simulation cells
//!
//! A cell is one grid unit of the burning domain: compressed factors, a small
//! mutable physical state, and links to its up to eight compass neighbors.
//! Neighbor links are indices into the owning step's cell arena, never
//! pointers across steps; step construction guarantees they are symmetric.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::core_types::geo::Coordinates;
use crate::core_types::weather::Factors;

/// Heat threshold above which a fueled cell sustains combustion (°C).
pub const IGNITION_TEMPERATURE: f64 = 500.0;

/// Cumulative combustion rate beyond which a cell counts as burned out.
/// The fuel decay curve leaves less than 0.01 % of the initial fuel here.
pub const COMBUSTION_EXHAUSTION: f64 = 10.0;

/// The eight compass offsets in neighbor-slot order.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Slot of an offset in a cell's neighbor table.
pub(crate) fn neighbor_slot(offset_x: i32, offset_y: i32) -> usize {
    debug_assert!((-1..=1).contains(&offset_x) && (-1..=1).contains(&offset_y));
    debug_assert!(offset_x != 0 || offset_y != 0);
    let index = (3 * (offset_x + 1) + offset_y + 1) as usize;
    // The (0, 0) hole in the 3x3 block is skipped.
    if index > 4 {
        index - 1
    } else {
        index
    }
}

/// Mutable physical state of one cell.
///
/// Fuel is not stored directly: the cell keeps the fuel load it was created
/// with and a monotonically growing cumulative combustion rate. The remaining
/// fuel is derived through a saturating decay, which makes fuel monotonicity
/// and damage detection structural properties instead of bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellState {
    initial_fuel: f32,
    heat: f32,
    cumulative_combustion_rate: f32,
}

impl CellState {
    pub fn new(heat: f64, initial_fuel: f64) -> Self {
        CellState {
            initial_fuel: initial_fuel as f32,
            heat: heat as f32,
            cumulative_combustion_rate: 0.0,
        }
    }

    /// Fuel load the cell was created with.
    pub fn initial_fuel(&self) -> f64 {
        f64::from(self.initial_fuel)
    }

    /// Remaining fuel: `initial_fuel · (2 − 2 / (1 + e^−rate))`, a strictly
    /// decreasing function of the cumulative combustion rate bounded in
    /// [0, initial_fuel].
    pub fn fuel(&self) -> f64 {
        let rate = f64::from(self.cumulative_combustion_rate);
        self.initial_fuel() * (2.0 - 2.0 / (1.0 + (-rate).exp()))
    }

    /// Cell temperature in °C.
    pub fn heat(&self) -> f64 {
        f64::from(self.heat)
    }

    pub fn set_heat(&mut self, heat: f64) {
        self.heat = heat as f32;
    }

    pub fn cumulative_combustion_rate(&self) -> f64 {
        f64::from(self.cumulative_combustion_rate)
    }

    /// Registers one tick's combustion. The cumulative rate never decreases,
    /// so derived fuel never increases.
    pub fn account_combustion(&mut self, combustion_rate: f64) {
        debug_assert!(combustion_rate >= 0.0);
        self.cumulative_combustion_rate += combustion_rate as f32;
    }

    /// Burns the cell out: the remaining fuel reads exactly zero from here
    /// on. Used to clamp insignificant fuel remainders.
    pub fn extinguish(&mut self) {
        self.cumulative_combustion_rate = f32::INFINITY;
    }

    /// Whether combustion ever started in this cell.
    pub fn is_damaged(&self) -> bool {
        self.cumulative_combustion_rate > 0.0
    }
}

/// One cell of a step's domain snapshot.
///
/// `neighbors` holds arena indices into the same step's cell list, in
/// [`NEIGHBOR_OFFSETS`] order; absent entries mean the neighbor cell was
/// never materialized. `emitted_energy` is scratch space for the energy a
/// burning cell releases within the current tick; it carries no meaning
/// across ticks.
#[derive(Debug, Clone)]
pub struct Cell {
    coordinates: Coordinates,
    state: CellState,
    factors: Factors,
    pub(crate) neighbors: [Option<u32>; 8],
    pub(crate) emitted_energy: f64,
}

impl Cell {
    pub fn new(coordinates: Coordinates, state: CellState, factors: Factors) -> Self {
        Cell {
            coordinates,
            state,
            factors,
            neighbors: [None; 8],
            emitted_energy: 0.0,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CellState {
        &mut self.state
    }

    pub fn factors(&self) -> &Factors {
        &self.factors
    }

    pub fn neighbor(&self, offset_x: i32, offset_y: i32) -> Option<u32> {
        self.neighbors[neighbor_slot(offset_x, offset_y)]
    }

    pub(crate) fn set_neighbor(&mut self, offset_x: i32, offset_y: i32, index: u32) {
        self.neighbors[neighbor_slot(offset_x, offset_y)] = Some(index);
    }

    /// Present neighbors as `(offset, arena index)` pairs.
    pub fn iter_neighbors(&self) -> impl Iterator<Item = ((i32, i32), u32)> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .zip(self.neighbors.iter())
            .filter_map(|(&offset, &index)| index.map(|index| (offset, index)))
    }

    /// Whether the cell actively burns: it has fuel left, is not burned out,
    /// is at ignition temperature, and the air admits combustion. A pure
    /// function of the current state and factors.
    pub fn is_burning(&self) -> bool {
        self.state.fuel() > 0.0
            && self.state.cumulative_combustion_rate() < COMBUSTION_EXHAUSTION
            && self.state.heat() >= IGNITION_TEMPERATURE
            && self.factors.air_humidity() < 1.0
            && self.factors.air_temperature() > 0.0
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Cell", 5)?;
        state.serialize_field("coordinates", &self.coordinates)?;
        state.serialize_field("heat", &self.state.heat())?;
        state.serialize_field("fuel", &self.state.fuel())?;
        state.serialize_field("isDamaged", &self.state.is_damaged())?;
        state.serialize_field("factors", &self.factors)?;
        state.end()
    }
}
