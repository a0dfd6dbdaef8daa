//! Compositing fetched tiles into one raster surface.
//!
//! The surface is `cols·T` × `rows·T` pixels. Present tiles are copied to
//! `(col·T, row·T)`; absent cells keep the background (transparent unless a
//! background color is configured). Tiles of another size (for example
//! 512px high-DPI tiles) are scaled into their `T×T` cell. A tile with no
//! pixels cannot be drawn and its cell gets the placeholder color instead.

use image::{imageops, Rgba, RgbaImage};
use tracing::{debug, trace, warn};

use crate::config::StitcherConfig;
use crate::crop::FILTER;
use crate::fetch::FetchSlot;
use crate::grid::TileGrid;

/// Surface layout and colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    pub tile_size: u32,
    pub background: Option<Rgba<u8>>,
    pub placeholder: Rgba<u8>,
}

impl CompositeOptions {
    pub fn from_config(config: &StitcherConfig) -> Self {
        Self {
            tile_size: config.tile_size(),
            background: config.background_color(),
            placeholder: config.placeholder_color(),
        }
    }
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self::from_config(&StitcherConfig::default())
    }
}

/// Draws every present slot onto a fresh surface.
///
/// `slots` is indexed like `grid.tiles()`; missing trailing slots are
/// treated as absent.
pub fn composite(grid: &TileGrid, slots: &[FetchSlot], options: &CompositeOptions) -> RgbaImage {
    let size = options.tile_size;
    let mut surface = match options.background {
        Some(color) => RgbaImage::from_pixel(grid.cols() * size, grid.rows() * size, color),
        None => RgbaImage::new(grid.cols() * size, grid.rows() * size),
    };

    let mut drawn = 0usize;
    let mut placeholders = 0usize;

    for (slot, tile) in slots.iter().enumerate().take(grid.len()) {
        let Some(tile) = tile else {
            continue;
        };

        let (col, row) = grid.cell(slot);
        let x = col * size;
        let y = row * size;

        let (width, height) = (tile.image.width(), tile.image.height());
        if width == 0 || height == 0 {
            warn!(url = %tile.url, tile = %tile.tile, "Tile has no pixels, using placeholder");
            fill_cell(&mut surface, x, y, size, options.placeholder);
            placeholders += 1;
            continue;
        }

        let mut pixels = tile.image.to_rgba8();
        if width != size || height != size {
            trace!(tile = %tile.tile, width, height, size, "Scaling tile into cell");
            pixels = imageops::resize(&pixels, size, size, FILTER);
        }

        imageops::replace(&mut surface, &pixels, x as i64, y as i64);
        drawn += 1;
    }

    debug!(
        width = surface.width(),
        height = surface.height(),
        drawn,
        placeholders,
        absent = grid.len() - drawn - placeholders,
        "Composite surface assembled"
    );

    surface
}

/// Fills a whole cell, overwriting any background.
fn fill_cell(surface: &mut RgbaImage, x: u32, y: u32, size: u32, color: Rgba<u8>) {
    for dy in 0..size {
        for dx in 0..size {
            surface.put_pixel(x + dx, y + dy, color);
        }
    }
}
