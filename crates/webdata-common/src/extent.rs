//! Bounding boxes, extents and the WGS84 extent validator.

use serde::{Deserialize, Serialize};

use crate::CrsCode;

/// The canonical world extent in EPSG:4326.
pub const WGS84_WORLD: BoundingBox = BoundingBox {
    min_x: -180.0,
    min_y: -90.0,
    max_x: 180.0,
    max_y: 90.0,
};

/// A geographic bounding box.
///
/// Coordinates are in degrees, longitude first: `(minLon, minLat, maxLon, maxLat)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse an OWS corner pair such as `LowerCorner`/`UpperCorner`: "x y".
    pub fn from_corners(lower: &str, upper: &str) -> Result<Self, BboxParseError> {
        let (min_x, min_y) = parse_corner(lower)?;
        let (max_x, max_y) = parse_corner(upper)?;
        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// All four values are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Check if this bbox shares at least one point with another (closed intervals).
    pub fn touches(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

fn parse_corner(s: &str) -> Result<(f64, f64), BboxParseError> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(BboxParseError::InvalidFormat(s.to_string()));
    }

    let x = parts[0]
        .parse()
        .map_err(|_| BboxParseError::InvalidNumber(parts[0].to_string()))?;
    let y = parts[1]
        .parse()
        .map_err(|_| BboxParseError::InvalidNumber(parts[1].to_string()))?;
    Ok((x, y))
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid corner format: {0}. Expected 'x y'")]
    InvalidFormat(String),

    #[error("Invalid number in corner: {0}")]
    InvalidNumber(String),
}

/// A bounding box together with the coordinate system it is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub bbox: BoundingBox,
    pub projection: CrsCode,
}

impl Extent {
    pub fn new(bbox: BoundingBox, projection: CrsCode) -> Self {
        Self { bbox, projection }
    }

    /// A WGS84 extent in EPSG:4326.
    pub fn wgs84(bbox: BoundingBox) -> Self {
        Self::new(bbox, CrsCode::Epsg4326)
    }

    /// The canonical world extent (-180,-90,180,90) in EPSG:4326.
    pub fn world() -> Self {
        Self::wgs84(WGS84_WORLD)
    }

    /// Whether the extent can be clamped into the world range at all.
    ///
    /// Rejects non-finite values, inverted axes, non-geographic projections
    /// and boxes lying completely outside the world.
    pub fn is_well_formed(&self) -> bool {
        let b = &self.bbox;
        self.projection.is_geographic()
            && b.is_finite()
            && b.min_x <= b.max_x
            && b.min_y <= b.max_y
            && b.touches(&WGS84_WORLD)
    }

    /// Normalize the extent to the valid WGS84 range.
    ///
    /// A malformed extent is replaced as a whole by [`Extent::world`];
    /// otherwise each value is clamped independently. Idempotent.
    pub fn validate(self) -> Extent {
        if !self.is_well_formed() {
            return Extent::world();
        }

        let b = self.bbox;
        Extent::new(
            BoundingBox::new(
                b.min_x.max(WGS84_WORLD.min_x),
                b.min_y.max(WGS84_WORLD.min_y),
                b.max_x.min(WGS84_WORLD.max_x),
                b.max_y.min(WGS84_WORLD.max_y),
            ),
            self.projection,
        )
    }
}

/// Validate an optional box, substituting the world extent when absent.
pub fn validate_or_world(bbox: Option<BoundingBox>) -> Extent {
    bbox.map(Extent::wgs84)
        .map(Extent::validate)
        .unwrap_or_else(Extent::world)
}
