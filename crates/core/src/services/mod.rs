//! Collaborator contracts consumed by the simulator
//!
//! The engine never reads terrain or weather data itself; it goes through
//! these traits. Production implementations sit outside this crate (raster
//! tiles, forecast API clients); this module only fixes the contracts and
//! ships the uniform/sloped doubles used by tests and calibration runs.

pub mod uniform;

use std::time::SystemTime;

use crate::core_types::geo::LatLng;
use crate::core_types::weather::{ForestType, Weather};

pub use uniform::{SlopedTerrainService, UniformTerrainService, UniformWeatherService};

/// Static terrain attributes for a geographic point.
pub trait TerrainService: Send + Sync {
    /// Fuel load in [0, 1].
    fn fuel(&self, point: LatLng) -> f64;

    /// Elevation above sea level in meters.
    fn elevation(&self, point: LatLng) -> f64;

    fn forest_type(&self, point: LatLng) -> ForestType;
}

/// Weather conditions for a geographic point at an instant.
///
/// `None` means the backing data source has no data for that point and time.
/// It is a transient availability condition, not a domain error; the
/// simulator reacts by finalizing the simulation at its last complete step.
pub trait WeatherService: Send + Sync {
    fn weather(&self, point: LatLng, time: SystemTime) -> Option<Weather>;
}
