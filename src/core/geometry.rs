//! Region of interest supplied with each request.
use serde::{Deserialize, Serialize};

/// Polygon rings in GeoJSON order: `[[[lon, lat], ...], ...]`.
///
/// Coordinates are forwarded to Earth Engine as-is; ring closure and
/// validity are checked remotely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub coordinates: Vec<Vec<Vec<f64>>>,
}

/// Geographic bounding box in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    /// `(lat, lon)` of the box center.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

impl Roi {
    pub fn new(coordinates: Vec<Vec<Vec<f64>>>) -> Self {
        Self { coordinates }
    }

    /// Bounding box over every position; `None` when no position has two ordinates.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self
            .coordinates
            .iter()
            .flatten()
            .filter(|p| p.len() >= 2 && p[0].is_finite() && p[1].is_finite());

        let first = positions.next()?;
        let init = Bounds {
            west: first[0],
            south: first[1],
            east: first[0],
            north: first[1],
        };
        Some(positions.fold(init, |b, p| Bounds {
            west: b.west.min(p[0]),
            south: b.south.min(p[1]),
            east: b.east.max(p[0]),
            north: b.north.max(p[1]),
        }))
    }
}
