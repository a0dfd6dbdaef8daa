//! Tile grid computation.
//!
//! Tiles are enumerated column-major: the outer loop walks x ascending, the
//! inner loop walks y ascending, so all tiles of one column are contiguous.
//! That order is the slot order used by the fetcher and the compositor:
//! slot `i` sits at column `i / rows`, row `i % rows`.

use tracing::debug;

use crate::coord::{Projection, TileCoord, TileRange};
use crate::error::StitchError;
use crate::view::View;

/// An ordered rows × cols matrix of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: u32,
    cols: u32,
    tiles: Vec<TileCoord>,
}

impl TileGrid {
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Tiles in slot order.
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Grid cell `(column, row)` of a slot index.
    #[inline]
    pub fn cell(&self, slot: usize) -> (u32, u32) {
        let rows = self.rows as usize;
        ((slot / rows) as u32, (slot % rows) as u32)
    }
}

/// Turns views into tile grids, enforcing the tile quota.
#[derive(Debug, Clone, Copy)]
pub struct TileGridBuilder {
    projection: Projection,
    max_tiles: usize,
}

impl TileGridBuilder {
    pub fn new(projection: Projection, max_tiles: usize) -> Self {
        Self {
            projection,
            max_tiles,
        }
    }

    /// Builds the grid for a view.
    ///
    /// Per-extent tile lists are concatenated in extent order, so for a split
    /// view the columns west of the antimeridian come first. Fails with
    /// [`StitchError::QuotaExceeded`] if the grid holds more than the
    /// configured maximum; nothing is fetched in that case.
    pub fn build_grid(&self, view: &View) -> Result<TileGrid, StitchError> {
        let ranges = view
            .extents
            .iter()
            .map(|extent| self.projection.tile_range(extent, view.zoom as i32))
            .collect::<Result<Vec<TileRange>, _>>()?;

        let first = ranges.first().ok_or_else(|| {
            StitchError::InternalInvariant("view has no extents".to_string())
        })?;

        if let Some(other) = ranges
            .iter()
            .find(|r| (r.min_y, r.max_y) != (first.min_y, first.max_y))
        {
            return Err(StitchError::InternalInvariant(format!(
                "extents of one view span different tile rows ({}..={} vs {}..={})",
                first.min_y, first.max_y, other.min_y, other.max_y
            )));
        }

        let rows = first.rows();
        let cols: u32 = ranges.iter().map(TileRange::cols).sum();
        let count = rows as usize * cols as usize;

        if count > self.max_tiles {
            return Err(StitchError::QuotaExceeded {
                tiles: count,
                max: self.max_tiles,
            });
        }

        let mut tiles = Vec::with_capacity(count);
        for range in &ranges {
            for x in range.min_x..=range.max_x {
                for y in range.min_y..=range.max_y {
                    tiles.push(TileCoord::new(view.zoom, x, y));
                }
            }
        }

        debug!(zoom = view.zoom, rows, cols, tiles = tiles.len(), "Tile grid built");

        Ok(TileGrid { rows, cols, tiles })
    }
}
