//! Stitcher configuration.

use image::Rgba;

use crate::coord::DEFAULT_TILE_SIZE;

/// Default maximum number of tiles in a single request grid (25 × 25).
pub const DEFAULT_MAX_TILES: usize = 625;

/// Default number of tile requests in flight per stitch.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 32;

/// First zoom level tried when resolving a view from a target size.
pub const DEFAULT_MIN_ZOOM: u8 = 3;

/// Last zoom level tried when resolving a view from a target size.
pub const DEFAULT_MAX_ZOOM: u8 = 22;

/// Fully transparent pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Immutable settings shared by every request a [`Stitcher`] serves.
///
/// [`Stitcher`]: crate::stitcher::Stitcher
///
/// # Example
///
/// ```
/// use mapstitch::config::StitcherConfig;
///
/// let config = StitcherConfig::default()
///     .with_max_tiles(400)
///     .with_max_concurrent_fetches(16);
///
/// assert_eq!(config.tile_size(), 256);
/// assert_eq!(config.max_tiles(), 400);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StitcherConfig {
    tile_size: u32,
    max_tiles: usize,
    max_concurrent_fetches: usize,
    min_zoom: u8,
    max_zoom: u8,
    background_color: Option<Rgba<u8>>,
    placeholder_color: Rgba<u8>,
}

impl Default for StitcherConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            max_tiles: DEFAULT_MAX_TILES,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            background_color: None,
            placeholder_color: TRANSPARENT,
        }
    }
}

impl StitcherConfig {
    /// Set the tile edge length in pixels. Zero is ignored.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        if tile_size > 0 {
            self.tile_size = tile_size;
        }
        self
    }

    /// Set the maximum number of tiles per request.
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    /// Set the number of concurrent tile requests per stitch (at least 1).
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Set the zoom search bounds used when resolving a view.
    ///
    /// The bounds are reordered if `min > max`.
    pub fn with_zoom_bounds(mut self, min: u8, max: u8) -> Self {
        self.min_zoom = min.min(max);
        self.max_zoom = min.max(max);
        self
    }

    /// Fill the composite surface with this color before drawing tiles.
    pub fn with_background_color(mut self, color: Option<Rgba<u8>>) -> Self {
        self.background_color = color;
        self
    }

    /// Color used for cells whose tile could not be drawn.
    pub fn with_placeholder_color(mut self, color: Rgba<u8>) -> Self {
        self.placeholder_color = color;
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn max_tiles(&self) -> usize {
        self.max_tiles
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn background_color(&self) -> Option<Rgba<u8>> {
        self.background_color
    }

    pub fn placeholder_color(&self) -> Rgba<u8> {
        self.placeholder_color
    }
}
