//! End-to-end tests for the stitching pipeline.
//!
//! These tests run the whole flow against an in-memory tile server:
//! - view resolution → grid → concurrent fetch → composite → crop
//! - antimeridian requests stitched across the seam
//! - per-tile failures and the tile quota
//!
//! Run with: `cargo test --test stitch_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use mapstitch::config::StitcherConfig;
use mapstitch::coord::Extent;
use mapstitch::encode::{encode, OutputFormat};
use mapstitch::error::StitchError;
use mapstitch::provider::{AsyncHttpClient, HttpResponse, ProviderTemplate, TransportOutcome};
use mapstitch::stitcher::{RenderRequest, Sizing, Stitcher};

// ============================================================================
// Helper Functions
// ============================================================================

const TILE: u32 = 16;

/// In-memory tile server for `mem://{z}/{x}/{y}` URLs.
///
/// Every tile is a solid color with red = x and green = y, so the origin of
/// any output pixel can be read back.
#[derive(Default)]
struct TileServer {
    failing_column: Option<u32>,
    calls: AtomicUsize,
}

impl TileServer {
    fn failing_column(x: u32) -> Self {
        Self {
            failing_column: Some(x),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AsyncHttpClient for TileServer {
    async fn get(&self, url: &str) -> TransportOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let parts: Vec<u32> = url
            .trim_start_matches("mem://")
            .split('/')
            .filter_map(|p| p.parse().ok())
            .collect();
        let [_, x, y] = parts[..] else {
            return Ok(HttpResponse::new(404, Vec::new()));
        };

        if self.failing_column == Some(x) {
            return Ok(HttpResponse::new(503, Vec::new()));
        }

        let tile = RgbaImage::from_pixel(TILE, TILE, Rgba([x as u8, y as u8, 200, 255]));
        let png = encode(&tile, OutputFormat::Png).expect("tile encodes");
        Ok(HttpResponse::new(200, png))
    }
}

fn template() -> ProviderTemplate {
    ProviderTemplate::parse("mem://{z}/{x}/{y}").unwrap()
}

fn config() -> StitcherConfig {
    StitcherConfig::default()
        .with_tile_size(TILE)
        .with_zoom_bounds(0, 12)
        .with_max_concurrent_fetches(3)
}

fn at_zoom(extent: Extent, zoom: u8) -> RenderRequest {
    RenderRequest {
        extent,
        sizing: Sizing::Zoom(zoom),
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// At zoom 3 with 16px tiles the world is 128px wide. The box 170°E..170°W
/// starts 12px into tile x=7 and runs 3px into tile x=0.
#[tokio::test]
async fn test_antimeridian_render_joins_both_sides() {
    let server = Arc::new(TileServer::default());
    let stitcher = Stitcher::with_shared_client(config(), Arc::clone(&server));
    let extent = Extent::new(170.0, -10.0, -170.0, 10.0);

    let image = stitcher
        .render(&template(), &at_zoom(extent, 3))
        .await
        .unwrap();

    assert_eq!(image.dimensions(), (7, 7));

    let columns: Vec<u8> = (0..7).map(|x| image.get_pixel(x, 0)[0]).collect();
    assert_eq!(columns, vec![7, 7, 7, 7, 0, 0, 0]);

    // Rows 12..16 of tile row 3, then tile row 4
    assert_eq!(image.get_pixel(0, 0)[1], 3);
    assert_eq!(image.get_pixel(0, 6)[1], 4);

    // Two columns (x=7, x=0) by two rows (y=3, y=4)
    assert_eq!(server.calls(), 4);
}

/// A west edge of exactly 180° is the same meridian as -180°, so the box
/// lies entirely in tile column x=0 and nothing is read from x=7.
#[tokio::test]
async fn test_west_edge_on_seam_reads_only_eastern_tiles() {
    let server = Arc::new(TileServer::default());
    let stitcher = Stitcher::with_shared_client(config(), Arc::clone(&server));
    let extent = Extent::new(180.0, -10.0, -170.0, 10.0);

    let image = stitcher
        .render(&template(), &at_zoom(extent, 3))
        .await
        .unwrap();

    assert_eq!(image.dimensions(), (4, 7));
    assert!(image.pixels().all(|p| p[0] == 0 && p[3] == 255));
    assert_eq!(server.calls(), 2);

    let sized = RenderRequest {
        extent,
        sizing: Sizing::Size {
            width: 40,
            height: 30,
        },
    };
    let image = stitcher.render(&template(), &sized).await.unwrap();
    // Resolves to zoom 7, where -180°..-170° covers tile columns 0..=3
    assert_eq!(image.dimensions(), (40, 30));
    assert!(image.pixels().all(|p| p[0] <= 3));
}

#[tokio::test]
async fn test_failed_tiles_leave_transparent_cells() {
    let stitcher = Stitcher::new(config(), TileServer::failing_column(0));
    let extent = Extent::new(170.0, -10.0, -170.0, 10.0);

    let image = stitcher
        .render(&template(), &at_zoom(extent, 3))
        .await
        .unwrap();

    assert_eq!(image.get_pixel(0, 0)[3], 255);
    assert_eq!(image.get_pixel(6, 0)[3], 0);
}

#[tokio::test]
async fn test_quota_rejects_before_any_request() {
    let server = Arc::new(TileServer::default());
    let stitcher = Stitcher::with_shared_client(config().with_max_tiles(10), Arc::clone(&server));
    let world = Extent::new(-180.0, -85.0, 180.0, 85.0);

    let err = stitcher
        .render(&template(), &at_zoom(world, 3))
        .await
        .unwrap_err();

    assert!(matches!(err, StitchError::QuotaExceeded { tiles: 64, max: 10 }));
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_sized_render_matches_request_exactly() {
    let stitcher = Stitcher::new(config(), TileServer::default());
    let extent = Extent::new(-3.0, 50.0, 2.0, 53.5);

    for (width, height) in [(64, 48), (100, 30), (17, 91)] {
        let request = RenderRequest {
            extent,
            sizing: Sizing::Size { width, height },
        };
        let image = stitcher.render(&template(), &request).await.unwrap();
        assert_eq!(image.dimensions(), (width, height));
    }
}

#[tokio::test]
async fn test_natural_dimensions_round_trip_through_crop() {
    let stitcher = Stitcher::new(config(), TileServer::default());
    let extent = Extent::new(-3.0, 50.0, 2.0, 53.5);

    let view = stitcher.view_at(&extent, 6).unwrap();
    let dims = stitcher.dimensions(&view);
    let surface = stitcher.stitch(&template(), &view).await.unwrap();
    let image = stitcher.crop(&surface, &view, dims.width, dims.height).unwrap();

    assert_eq!(image.dimensions(), (dims.width, dims.height));
    assert!(image.pixels().all(|p| p[3] == 255));
}
