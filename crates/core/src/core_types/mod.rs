//! Core data model: grid geometry, compressed factors, cells, steps and the
//! simulation timeline.

pub mod cell;
pub mod geo;
pub mod step;
pub mod timeline;
pub mod weather;

pub use cell::{Cell, CellState, COMBUSTION_EXHAUSTION, IGNITION_TEMPERATURE, NEIGHBOR_OFFSETS};
pub use geo::{Coordinates, Grid, LatLng};
pub use step::Step;
pub use timeline::Timeline;
pub use weather::{Factors, ForestType, Weather};
