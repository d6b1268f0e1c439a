//! Compressed weather and terrain factors
//!
//! A simulation step can hold tens of thousands of cells, and every cell
//! carries its own factors, so the snapshot is packed into single bytes per
//! field. The rounding is intentional and must stay bit-reproducible:
//! temperature to the nearest whole °C clamped to an i8, humidity to the
//! nearest 1 %, wind components to the nearest 0.1 m/s clamped to an i8.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Forest-type classification driving combustion kinetics.
///
/// Codes match the land-cover raster classes of the terrain data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ForestType {
    Treeless = 0,
    EvergreenNeedleLeaf = 1,
    EvergreenBroadleaf = 2,
    DeciduousNeedleLeaf = 3,
    DeciduousBroadleaf = 4,
    Mixed = 5,
}

impl ForestType {
    /// Raster class code to forest type. Unknown codes count as treeless.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ForestType::EvergreenNeedleLeaf,
            2 => ForestType::EvergreenBroadleaf,
            3 => ForestType::DeciduousNeedleLeaf,
            4 => ForestType::DeciduousBroadleaf,
            5 => ForestType::Mixed,
            _ => ForestType::Treeless,
        }
    }

    /// Arrhenius activation energy in J/mol. Treeless terrain cannot ignite,
    /// expressed as an infinite energy barrier.
    pub fn activation_energy(self) -> f64 {
        match self {
            ForestType::Treeless => f64::INFINITY,
            ForestType::EvergreenNeedleLeaf => 120_000.0,
            ForestType::EvergreenBroadleaf => 140_000.0,
            ForestType::DeciduousNeedleLeaf => 160_000.0,
            ForestType::DeciduousBroadleaf => 170_000.0,
            ForestType::Mixed => 150_000.0,
        }
    }
}

/// Round half up: 0.5 goes to 1, -0.5 goes to 0.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn compact_to_byte(value: i64) -> i8 {
    value.clamp(i64::from(i8::MIN), i64::from(i8::MAX)) as i8
}

/// One compressed weather snapshot: 4 bytes per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weather {
    air_temperature: i8,
    air_humidity: i8,
    wind_x: i8,
    wind_y: i8,
}

impl Weather {
    /// Compress from physical units: °C, relative humidity in [0, 1], wind
    /// components in m/s.
    pub fn new(air_temperature: f64, air_humidity: f64, wind_x: f64, wind_y: f64) -> Self {
        Weather {
            air_temperature: compact_to_byte(round_half_up(air_temperature)),
            air_humidity: round_half_up(air_humidity.clamp(0.0, 1.0) * 100.0) as i8,
            wind_x: compact_to_byte(round_half_up(wind_x * 10.0)),
            wind_y: compact_to_byte(round_half_up(wind_y * 10.0)),
        }
    }

    /// Air temperature in °C.
    pub fn air_temperature(&self) -> f64 {
        f64::from(self.air_temperature)
    }

    /// Relative humidity in [0, 1].
    pub fn air_humidity(&self) -> f64 {
        f64::from(self.air_humidity) / 100.0
    }

    /// Eastward wind component in m/s.
    pub fn wind_x(&self) -> f64 {
        f64::from(self.wind_x) / 10.0
    }

    /// Northward wind component in m/s.
    pub fn wind_y(&self) -> f64 {
        f64::from(self.wind_y) / 10.0
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_x().hypot(self.wind_y())
    }
}

impl Serialize for Weather {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Weather", 4)?;
        state.serialize_field("airTemperature", &self.air_temperature())?;
        state.serialize_field("airHumidity", &self.air_humidity())?;
        state.serialize_field("windX", &self.wind_x())?;
        state.serialize_field("windY", &self.wind_y())?;
        state.end()
    }
}

const MAX_ELEVATION: f64 = 6400.0;

/// Weather plus compressed terrain attributes of one cell.
///
/// Elevation is clamped to [0, 6400] m and mapped onto the positive i16
/// range. Two factors are equal iff every compressed field matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Factors {
    weather: Weather,
    elevation: i16,
    forest_type: ForestType,
}

impl Factors {
    pub fn new(elevation: f64, forest_type: ForestType, weather: Weather) -> Self {
        Factors {
            weather,
            elevation: Self::compress_elevation(elevation),
            forest_type,
        }
    }

    fn compress_elevation(elevation: f64) -> i16 {
        let clamped = elevation.clamp(0.0, MAX_ELEVATION);
        round_half_up(clamped / MAX_ELEVATION * f64::from(i16::MAX)) as i16
    }

    /// Elevation in meters, within the compression tolerance (~0.2 m).
    pub fn elevation(&self) -> f64 {
        f64::from(self.elevation) * MAX_ELEVATION / f64::from(i16::MAX)
    }

    pub fn forest_type(&self) -> ForestType {
        self.forest_type
    }

    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    pub fn air_temperature(&self) -> f64 {
        self.weather.air_temperature()
    }

    pub fn air_humidity(&self) -> f64 {
        self.weather.air_humidity()
    }

    pub fn wind_x(&self) -> f64 {
        self.weather.wind_x()
    }

    pub fn wind_y(&self) -> f64 {
        self.weather.wind_y()
    }
}

impl Serialize for Factors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Factors", 6)?;
        state.serialize_field("airTemperature", &self.air_temperature())?;
        state.serialize_field("airHumidity", &self.air_humidity())?;
        state.serialize_field("windX", &self.wind_x())?;
        state.serialize_field("windY", &self.wind_y())?;
        state.serialize_field("elevation", &self.elevation())?;
        state.serialize_field("forestType", &self.forest_type)?;
        state.end()
    }
}
