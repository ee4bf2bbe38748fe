//! Coordinate reference system identifiers as advertised in capability documents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS codes the source tree understands.
///
/// Capability documents spell the same system in several ways
/// (`EPSG:4326`, `urn:ogc:def:crs:EPSG::4326`,
/// `http://www.opengis.net/def/crs/EPSG/0/4326`); all of them map to one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// OGC CRS:84, WGS84 with longitude first
    Crs84,
    /// WGS84 Geographic
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
}

impl CrsCode {
    /// Parse a CRS identifier as found in `CRS`/`SRS` attributes or
    /// `SupportedCRS` elements.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:3857"
    /// - "CRS:84"
    /// - "urn:ogc:def:crs:EPSG::3857"
    /// - "urn:ogc:def:crs:OGC:1.3:CRS84"
    /// - "http://www.opengis.net/def/crs/EPSG/0/4326"
    pub fn from_identifier(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        if normalized == "CRS:84" || normalized.ends_with("CRS84") {
            return Ok(CrsCode::Crs84);
        }

        let code = normalized
            .rsplit(|c: char| c == ':' || c == '/')
            .next()
            .unwrap_or_default();

        match code {
            "4326" => Ok(CrsCode::Epsg4326),
            "4269" => Ok(CrsCode::Epsg4269),
            "3857" | "900913" | "102100" => Ok(CrsCode::Epsg3857),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Axis order of bounding box attributes in WMS 1.3.0.
    ///
    /// WMS 1.3.0 uses the "natural" axis order of the CRS:
    /// - EPSG geographic CRS: lat, lon (y, x)
    /// - CRS:84 and projected CRS: x, y
    pub fn axis_order_wms_1_3(&self) -> AxisOrder {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 => AxisOrder::LatLon,
            _ => AxisOrder::XY,
        }
    }

    /// Axis order for WMS 1.1.1 (always x, y regardless of CRS).
    pub fn axis_order_wms_1_1(&self) -> AxisOrder {
        AxisOrder::XY
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Crs84 | CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Crs84 => "CRS:84",
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg3857 => "EPSG:3857",
        };
        write!(f, "{}", code)
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
