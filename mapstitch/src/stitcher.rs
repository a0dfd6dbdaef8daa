//! The stitching facade.
//!
//! [`Stitcher`] wires the pipeline together:
//!
//! ```text
//! resolve view ─► tile grid ─► fetch (async) ─► composite ─► crop
//!                 (quota)                       (blocking)   (blocking)
//! ```
//!
//! A stitcher is built once from an immutable [`StitcherConfig`] and shared
//! by cloning; clones share the HTTP client and its connection pool.

use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use tracing::{debug, info, instrument};

use crate::composite::{composite, CompositeOptions};
use crate::config::StitcherConfig;
use crate::coord::{Extent, Projection};
use crate::crop;
use crate::error::StitchError;
use crate::fetch::{plan_requests, DefaultValidator, TileFetcher, TileValidator};
use crate::grid::{TileGrid, TileGridBuilder};
use crate::provider::{AsyncHttpClient, ProviderTemplate};
use crate::view::{Dimensions, View, ViewResolver};

/// How the output size of a render is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Fixed zoom; the output takes the view's natural size.
    Zoom(u8),
    /// Fixed output size; the zoom is chosen to provide enough pixels.
    Size { width: u32, height: u32 },
}

/// An extent plus a sizing rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub extent: Extent,
    pub sizing: Sizing,
}

/// Renders map images for extents.
pub struct Stitcher<C, V = DefaultValidator> {
    config: Arc<StitcherConfig>,
    client: Arc<C>,
    validator: Arc<V>,
    resolver: ViewResolver,
    grid_builder: TileGridBuilder,
}

impl<C, V> Clone for Stitcher<C, V> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            client: Arc::clone(&self.client),
            validator: Arc::clone(&self.validator),
            resolver: self.resolver,
            grid_builder: self.grid_builder,
        }
    }
}

impl<C> Stitcher<C, DefaultValidator>
where
    C: AsyncHttpClient + 'static,
{
    /// Creates a stitcher that uses [`DefaultValidator`].
    pub fn new(config: StitcherConfig, client: C) -> Self {
        Self::with_shared_client(config, Arc::new(client))
    }

    /// Creates a stitcher on a client that is shared with other components.
    pub fn with_shared_client(config: StitcherConfig, client: Arc<C>) -> Self {
        let projection = Projection::new(config.tile_size());
        Self {
            resolver: ViewResolver::new(projection, config.min_zoom(), config.max_zoom()),
            grid_builder: TileGridBuilder::new(projection, config.max_tiles()),
            config: Arc::new(config),
            client,
            validator: Arc::new(DefaultValidator),
        }
    }
}

impl<C, V> Stitcher<C, V>
where
    C: AsyncHttpClient + 'static,
    V: TileValidator + 'static,
{
    /// Replaces the tile validator.
    pub fn with_validator<W: TileValidator + 'static>(self, validator: W) -> Stitcher<C, W> {
        Stitcher {
            config: self.config,
            client: self.client,
            validator: Arc::new(validator),
            resolver: self.resolver,
            grid_builder: self.grid_builder,
        }
    }

    pub fn config(&self) -> &StitcherConfig {
        &self.config
    }

    /// Picks the zoom that gives at least `width` × `height` pixels.
    pub fn resolve_view(&self, extent: &Extent, width: u32, height: u32) -> Result<View, StitchError> {
        self.resolver.resolve(extent, width, height)
    }

    /// A view at an explicit zoom.
    pub fn view_at(&self, extent: &Extent, zoom: u8) -> Result<View, StitchError> {
        self.resolver.view_at(extent, zoom)
    }

    /// The natural pixel size of a view.
    pub fn dimensions(&self, view: &View) -> Dimensions {
        self.resolver.dimensions(view)
    }

    /// The tile grid for a view, with the tile quota applied.
    pub fn tile_grid(&self, view: &View) -> Result<TileGrid, StitchError> {
        self.grid_builder.build_grid(view)
    }

    /// Fetches and composites every tile of the view.
    ///
    /// The result covers whole tiles; use [`crop`](Self::crop) to cut out the
    /// view itself. Fails before any request is made if the grid exceeds the
    /// tile quota.
    #[instrument(skip_all, fields(zoom = view.zoom, provider = %template))]
    pub async fn stitch(
        &self,
        template: &ProviderTemplate,
        view: &View,
    ) -> Result<RgbaImage, StitchError> {
        let started = Instant::now();
        let grid = self.tile_grid(view)?;
        info!(tiles = grid.len(), "Fetching {} tiles", grid.len());

        let fetcher = TileFetcher::new(
            Arc::clone(&self.client),
            Arc::clone(&self.validator),
            self.config.max_concurrent_fetches(),
        );
        let slots = fetcher.fetch_all(plan_requests(&grid, template)).await?;

        let options = CompositeOptions::from_config(&self.config);
        let surface = tokio::task::spawn_blocking(move || composite(&grid, &slots, &options))
            .await
            .map_err(|e| StitchError::Task(format!("compositing task failed: {}", e)))?;

        debug!(
            width = surface.width(),
            height = surface.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stitch complete"
        );

        Ok(surface)
    }

    /// Cuts the view out of a stitched surface and scales it to
    /// `width` × `height`.
    pub fn crop(
        &self,
        surface: &RgbaImage,
        view: &View,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, StitchError> {
        crop::crop(surface, &self.resolver, view, width, height)
    }

    /// Resolves, stitches and crops in one go.
    ///
    /// With [`Sizing::Zoom`] the output has the view's natural size at that
    /// zoom; with [`Sizing::Size`] it has exactly the requested size.
    #[instrument(skip_all, fields(extent = %request.extent))]
    pub async fn render(
        &self,
        template: &ProviderTemplate,
        request: &RenderRequest,
    ) -> Result<RgbaImage, StitchError> {
        let started = Instant::now();

        let (view, width, height) = match request.sizing {
            Sizing::Zoom(zoom) => {
                let view = self.view_at(&request.extent, zoom)?;
                let dims = self.dimensions(&view);
                (view, dims.width, dims.height)
            }
            Sizing::Size { width, height } => {
                let view = self.resolve_view(&request.extent, width, height)?;
                (view, width, height)
            }
        };

        let surface = self.stitch(template, &view).await?;

        let resolver = self.resolver;
        let image = tokio::task::spawn_blocking(move || {
            crop::crop(&surface, &resolver, &view, width, height)
        })
        .await
        .map_err(|e| StitchError::Task(format!("crop task failed: {}", e)))??;

        info!(
            width,
            height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Render complete"
        );

        Ok(image)
    }
}
