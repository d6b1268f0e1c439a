//! Geographic grid geometry
//!
//! Maps geographic points onto an integer cell lattice and back. The lattice
//! covers the whole globe in an equirectangular layout: `scale` cells per
//! degree for both latitude and longitude. Longitude wraps around the
//! antimeridian; stepping over a pole reflects onto the antipodal longitude
//! band, so every `(coordinates, offset)` pair yields a valid neighbor.

use serde::Serialize;

/// Earth equatorial circumference: 40 075 km. Earth polar circumference: 39 930 km.
const EARTH_CIRCUMFERENCE: f64 = 40_000_000.0;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

/// Integer cell index pair. Equality and hashing are by value, so coordinates
/// can key the draft-step index map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Self {
        Coordinates { x, y }
    }
}

/// Immutable grid geometry parameterized by cells-per-degree.
///
/// Cell size of 1/`scale`° for both latitude and longitude corresponds with
/// height ≈110/`scale` km and width ≈110/`scale` km near the equator.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Grid {
    scale: i32,
    #[serde(skip)]
    cell_height: f64,
}

impl Grid {
    pub fn new(scale: i32) -> Self {
        debug_assert!(scale > 0);
        Grid {
            scale,
            cell_height: EARTH_CIRCUMFERENCE / 360.0 / f64::from(scale),
        }
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Cell height in meters. Width equals height at the equator and shrinks
    /// with cos(latitude) toward the poles.
    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Cell containing the given point.
    pub fn coordinates_of(&self, point: LatLng) -> Coordinates {
        let scale = f64::from(self.scale);
        let mut x = (point.lng * scale).floor() as i32;
        let mut y = (point.lat * scale).floor() as i32;
        // Collapse the antimeridian onto the x = -180·scale column.
        if x == 180 * self.scale || x + 1 == -180 * self.scale {
            x = -180 * self.scale;
        }
        // The poles belong to the outermost rows.
        if y == 90 * self.scale {
            y = 90 * self.scale - 1;
        }
        if y + 1 == -90 * self.scale {
            y = -90 * self.scale;
        }
        Coordinates::new(x, y)
    }

    /// Center point of a cell.
    pub fn point_of(&self, coordinates: Coordinates) -> LatLng {
        let scale = f64::from(self.scale);
        LatLng::new(
            (f64::from(coordinates.y) + 0.5) / scale,
            (f64::from(coordinates.x) + 0.5) / scale,
        )
    }

    /// Coordinates of the cell one offset step away.
    ///
    /// Longitude wraps modulo 360·scale. A step across a pole reflects onto
    /// the antipodal longitude band: the row stays at the polar edge and the
    /// x offset gains half the world's width.
    pub fn neighbor(&self, coordinates: Coordinates, offset_x: i32, offset_y: i32) -> Coordinates {
        debug_assert!((-1..=1).contains(&offset_x) && (-1..=1).contains(&offset_y));
        let mut offset_x = offset_x;
        let mut y = coordinates.y + offset_y;
        if y < -90 * self.scale || 90 * self.scale <= y {
            y = (if y < 0 { -1 } else { 1 }) * 180 * self.scale - y - 1;
            offset_x = 180 * self.scale - offset_x;
        }
        let mut x = coordinates.x + offset_x;
        if x < -180 * self.scale {
            x += 360 * self.scale;
        }
        if 180 * self.scale <= x {
            x -= 360 * self.scale;
        }
        Coordinates::new(x, y)
    }

    /// Cell area in m², corrected for equirectangular distortion.
    pub fn estimate_cell_area(&self, coordinates: Coordinates) -> f64 {
        let lat = self.point_of(coordinates).lat;
        self.cell_height * self.cell_height * lat.to_radians().cos()
    }

    /// Distance to the cell one offset step away, in cell-height units.
    ///
    /// Derived from the offset itself rather than coordinate deltas, so
    /// neighbors across the antimeridian keep their true single-cell
    /// distance.
    pub fn offset_distance(&self, coordinates: Coordinates, offset_x: i32, offset_y: i32) -> f64 {
        let local_cos = self.point_of(coordinates).lat.to_radians().cos();
        let dx = f64::from(offset_x) * local_cos;
        let dy = f64::from(offset_y);
        (dx * dx + dy * dy).sqrt()
    }
}
