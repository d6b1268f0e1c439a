//! Synthetic terrain and weather doubles
//!
//! Uniform services answer every lookup with the same value; the sloped
//! variant adds a constant elevation gradient. Both exist for integration
//! tests and for calibration scenarios where real rasters would only add
//! noise.

use std::time::SystemTime;

use crate::core_types::geo::LatLng;
use crate::core_types::weather::{ForestType, Weather};
use crate::services::{TerrainService, WeatherService};

/// Terrain with identical attributes everywhere.
#[derive(Debug, Clone, Copy)]
pub struct UniformTerrainService {
    forest_type: ForestType,
    fuel: f64,
    elevation: f64,
}

impl UniformTerrainService {
    pub fn new(forest_type: ForestType, fuel: f64, elevation: f64) -> Self {
        UniformTerrainService {
            forest_type,
            fuel,
            elevation,
        }
    }
}

impl TerrainService for UniformTerrainService {
    fn fuel(&self, _point: LatLng) -> f64 {
        self.fuel
    }

    fn elevation(&self, _point: LatLng) -> f64 {
        self.elevation
    }

    fn forest_type(&self, _point: LatLng) -> ForestType {
        self.forest_type
    }
}

/// Terrain rising at a fixed grade along a fixed compass direction.
#[derive(Debug, Clone, Copy)]
pub struct SlopedTerrainService {
    forest_type: ForestType,
    fuel: f64,
    slope: f64,
    slope_vector: (f64, f64),
}

impl SlopedTerrainService {
    /// `slope_degrees` is the terrain grade; `direction_degrees` is the
    /// compass direction of ascent.
    pub fn new(
        forest_type: ForestType,
        fuel: f64,
        slope_degrees: f64,
        direction_degrees: f64,
    ) -> Self {
        let direction = direction_degrees.to_radians();
        SlopedTerrainService {
            forest_type,
            fuel,
            slope: slope_degrees.to_radians().tan(),
            slope_vector: (direction.cos(), direction.sin()),
        }
    }
}

impl TerrainService for SlopedTerrainService {
    fn fuel(&self, _point: LatLng) -> f64 {
        self.fuel
    }

    fn elevation(&self, point: LatLng) -> f64 {
        let distance = point.lat * self.slope_vector.0 + point.lng * self.slope_vector.1;
        distance * self.slope
    }

    fn forest_type(&self, _point: LatLng) -> ForestType {
        self.forest_type
    }
}

/// Weather identical at every point and time.
#[derive(Debug, Clone, Copy)]
pub struct UniformWeatherService {
    weather: Weather,
}

impl UniformWeatherService {
    pub fn new(air_temperature: f64, air_humidity: f64, wind_x: f64, wind_y: f64) -> Self {
        UniformWeatherService {
            weather: Weather::new(air_temperature, air_humidity, wind_x, wind_y),
        }
    }
}

impl WeatherService for UniformWeatherService {
    fn weather(&self, _point: LatLng, _time: SystemTime) -> Option<Weather> {
        Some(self.weather)
    }
}
