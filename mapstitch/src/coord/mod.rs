//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (longitude/latitude),
//! global Web Mercator pixel positions and tile indices at a given zoom.

mod types;

pub use types::{
    CoordError, Extent, PixelPoint, TileCoord, TileRange, DEFAULT_TILE_SIZE, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Validates a zoom level coming from outside the crate.
///
/// Negative values and values above [`MAX_ZOOM`] are rejected.
pub fn checked_zoom(zoom: i32) -> Result<u8, CoordError> {
    if zoom < MIN_ZOOM as i32 || zoom > MAX_ZOOM as i32 {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(zoom as u8)
}

/// Web Mercator projection for square tiles of a fixed pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    tile_size: u32,
}

impl Projection {
    /// Creates a projection for tiles of `tile_size` × `tile_size` pixels.
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    /// Tile edge length in pixels.
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Width (and height) of the whole world in pixels at `zoom`.
    #[inline]
    pub fn world_size(&self, zoom: u8) -> f64 {
        self.tile_size as f64 * 2.0_f64.powi(zoom as i32)
    }

    /// Projects a longitude/latitude pair to a global pixel position.
    ///
    /// Latitude is clamped to the Web Mercator range before projection and
    /// the result is clamped to the world bounds, so the function is total.
    #[inline]
    pub fn to_pixel(&self, lng: f64, lat: f64, zoom: u8) -> PixelPoint {
        let size = self.world_size(zoom);

        let x = (lng + 180.0) / 360.0 * size;

        let lat = lat.clamp(MIN_LAT, MAX_LAT);
        let sin = (lat * PI / 180.0).sin();
        let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size;

        PixelPoint {
            x: x.clamp(0.0, size),
            y: y.clamp(0.0, size),
        }
    }

    /// Returns the tiles covering a (non-crossing) extent at `zoom`.
    ///
    /// The north-west corner is floored to its tile. The south-east edge
    /// resolves to the tile holding its last pixel, so an edge that lies
    /// exactly on a tile boundary does not pull in an extra row or column.
    /// Antimeridian-crossing extents must be split before calling this.
    pub fn tile_range(&self, extent: &Extent, zoom: i32) -> Result<TileRange, CoordError> {
        let zoom = checked_zoom(zoom)?;
        let tile = self.tile_size as f64;
        let last = (2u64.pow(zoom as u32) - 1) as f64;

        let nw = self.to_pixel(extent.west, extent.north, zoom);
        let se = self.to_pixel(extent.east, extent.south, zoom);

        let min_x = (nw.x / tile).floor().clamp(0.0, last);
        let min_y = (nw.y / tile).floor().clamp(0.0, last);
        let max_x = ((se.x / tile).ceil() - 1.0).clamp(min_x, last);
        let max_y = ((se.y / tile).ceil() - 1.0).clamp(min_y, last);

        Ok(TileRange {
            min_x: min_x as u32,
            max_x: max_x as u32,
            min_y: min_y as u32,
            max_y: max_y as u32,
        })
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_world_center() {
        let proj = Projection::default();
        let p = proj.to_pixel(0.0, 0.0, 1);
        assert!((p.x - 256.0).abs() < 1e-9);
        assert!((p.y - 256.0).abs() < 1e-9);
    }

    #[test]
    fn test_world_corners() {
        let proj = Projection::default();
        let nw = proj.to_pixel(-180.0, 90.0, 2);
        let se = proj.to_pixel(180.0, -90.0, 2);

        assert_eq!(nw.x, 0.0);
        assert!(nw.y.abs() < 1e-6, "clamped latitude should reach the top edge");
        assert_eq!(se.x, 1024.0);
        assert!((se.y - 1024.0).abs() < 1e-6);
    }

    #[test]
    fn test_latitude_is_clamped() {
        let proj = Projection::default();
        let beyond = proj.to_pixel(10.0, 89.9, 5);
        let limit = proj.to_pixel(10.0, MAX_LAT, 5);
        assert_eq!(beyond, limit);
    }

    #[test]
    fn test_custom_tile_size_scales_linearly() {
        let small = Projection::new(256).to_pixel(-74.0060, 40.7128, 10);
        let large = Projection::new(512).to_pixel(-74.0060, 40.7128, 10);
        assert!((large.x - small.x * 2.0).abs() < 1e-6);
        assert!((large.y - small.y * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_tile_range_new_york() {
        // New York City: 40.7128°N, 74.0060°W sits in tile 19295/24640 at z16
        let proj = Projection::default();
        let extent = Extent::new(-74.0061, 40.7127, -74.0059, 40.7129);
        let range = proj.tile_range(&extent, 16).unwrap();

        assert_eq!(range.min_x, 19295);
        assert_eq!(range.max_x, 19295);
        assert_eq!(range.min_y, 24640);
        assert_eq!(range.max_y, 24640);
    }

    #[test]
    fn test_tile_range_on_tile_boundary() {
        // Exactly the north-west quadrant of the world at zoom 1
        let proj = Projection::default();
        let extent = Extent::new(-180.0, 0.0, 0.0, MAX_LAT);
        let range = proj.tile_range(&extent, 1).unwrap();

        assert_eq!((range.min_x, range.max_x), (0, 0));
        assert_eq!((range.min_y, range.max_y), (0, 0));
        assert_eq!(range.cols(), 1);
        assert_eq!(range.rows(), 1);
    }

    #[test]
    fn test_tile_range_whole_world() {
        let proj = Projection::default();
        let extent = Extent::new(-180.0, -90.0, 180.0, 90.0);
        let range = proj.tile_range(&extent, 3).unwrap();

        assert_eq!((range.min_x, range.max_x), (0, 7));
        assert_eq!((range.min_y, range.max_y), (0, 7));
    }

    #[test]
    fn test_tile_range_negative_zoom() {
        let proj = Projection::default();
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
        let result = proj.tile_range(&extent, -1);
        assert!(matches!(result, Err(CoordError::InvalidZoom(-1))));
    }

    #[test]
    fn test_checked_zoom_bounds() {
        assert_eq!(checked_zoom(0), Ok(0));
        assert_eq!(checked_zoom(MAX_ZOOM as i32), Ok(MAX_ZOOM));
        assert!(checked_zoom(MAX_ZOOM as i32 + 1).is_err());
        assert!(checked_zoom(-3).is_err());
    }

    #[test]
    fn test_extent_from_corners_normalizes() {
        let extent = Extent::from_corners(10.0, 50.0, -5.0, 40.0);
        assert_eq!(extent, Extent::new(-5.0, 40.0, 10.0, 50.0));
        assert!(!extent.crosses_antimeridian());
    }

    #[test]
    fn test_extent_south_west_north_east_order() {
        let extent = Extent::from_south_west_north_east(-10.0, 170.0, 10.0, -170.0);
        assert_eq!(extent.west, 170.0);
        assert_eq!(extent.south, -10.0);
        assert_eq!(extent.east, -170.0);
        assert_eq!(extent.north, 10.0);
        assert!(extent.crosses_antimeridian());
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_longitude_monotonic(
                lat in -85.0..85.0_f64,
                lon1 in -180.0..180.0_f64,
                lon2 in -180.0..180.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let proj = Projection::default();
                let (west, east) = if lon1 <= lon2 { (lon1, lon2) } else { (lon2, lon1) };
                let a = proj.to_pixel(west, lat, zoom);
                let b = proj.to_pixel(east, lat, zoom);
                prop_assert!(a.x <= b.x, "x not monotonic: {} -> {}, {} -> {}", west, a.x, east, b.x);
            }

            #[test]
            fn test_north_to_south_monotonic(
                lon in -180.0..180.0_f64,
                lat1 in -90.0..90.0_f64,
                lat2 in -90.0..90.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let proj = Projection::default();
                let (south, north) = if lat1 <= lat2 { (lat1, lat2) } else { (lat2, lat1) };
                let n = proj.to_pixel(lon, north, zoom);
                let s = proj.to_pixel(lon, south, zoom);
                prop_assert!(n.y <= s.y, "y not monotonic: {} -> {}, {} -> {}", north, n.y, south, s.y);
            }

            #[test]
            fn test_tile_range_in_bounds(
                west in -180.0..0.0_f64,
                east in 0.0..180.0_f64,
                south in -85.0..0.0_f64,
                north in 0.0..85.0_f64,
                zoom in 0u8..=18
            ) {
                let proj = Projection::default();
                let range = proj.tile_range(&Extent::new(west, south, east, north), zoom as i32)?;
                let n = 2u32.pow(zoom as u32);

                prop_assert!(range.min_x <= range.max_x && range.max_x < n);
                prop_assert!(range.min_y <= range.max_y && range.max_y < n);
            }
        }
    }
}
