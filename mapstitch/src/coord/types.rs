//! Coordinate type definitions

use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted by the projection.
///
/// Tile indices are `u32`, and `2^24 * 256` pixels still fits comfortably in
/// an `f64` mantissa.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 24;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Geographic bounding box in degrees.
///
/// When `west > east` the box crosses the antimeridian: its western edge is
/// numerically east of its eastern edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    /// Creates an extent, swapping `south`/`north` if they are inverted.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        let (south, north) = if south > north {
            (north, south)
        } else {
            (south, north)
        };
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Builds an extent from two corners given in any order.
    ///
    /// Both axes are normalized to min/max, so the result never crosses the
    /// antimeridian. This is the ordering accepted on the command line.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            west: x1.min(x2),
            south: y1.min(y2),
            east: x1.max(x2),
            north: y1.max(y2),
        }
    }

    /// Builds an extent from `south, west, north, east` ordering.
    pub fn from_south_west_north_east(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(west, south, east, north)
    }

    /// Returns true if the extent crosses the ±180° meridian.
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Moves an edge lying exactly on the antimeridian to the side that
    /// stops the box from crossing it.
    ///
    /// `west = 180` becomes `-180` and `east = -180` becomes `180`, so
    /// splitting never produces a zero-width half.
    pub fn normalize_seam(&self) -> Self {
        let mut extent = *self;
        if extent.crosses_antimeridian() {
            if extent.west == MAX_LON {
                extent.west = MIN_LON;
            }
            if extent.east == MIN_LON {
                extent.east = MAX_LON;
            }
        }
        extent
    }

    /// Longitude span in degrees (never negative for a non-crossing extent).
    #[inline]
    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.west, self.south, self.east, self.north
        )
    }
}

/// Tile coordinates in the Web Mercator / Slippy Map system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level
    pub zoom: u8,
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileCoord {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Global pixel position at a given zoom, origin at the north-west corner of
/// the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Inclusive range of tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Number of tile columns in the range.
    #[inline]
    pub fn cols(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Number of tile rows in the range.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Zoom level outside `MIN_ZOOM..=MAX_ZOOM`
    InvalidZoom(i32),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidZoom(zoom) => write!(
                f,
                "Invalid zoom level: {} (must be between {} and {})",
                zoom, MIN_ZOOM, MAX_ZOOM
            ),
        }
    }
}

impl std::error::Error for CoordError {}
