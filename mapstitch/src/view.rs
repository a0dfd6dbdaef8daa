//! View resolution: choosing a zoom (and splitting the extent when it crosses
//! the antimeridian) so the stitched image can satisfy a target pixel size.

use tracing::debug;

use crate::coord::{checked_zoom, Extent, PixelPoint, Projection, MAX_LON, MIN_LON};
use crate::error::StitchError;

/// One or two extents sharing a single zoom, ready for tile-grid computation.
///
/// Two extents only occur for antimeridian-crossing requests: the first
/// covers `[west, 180]`, the second `[-180, east]`.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub extents: Vec<Extent>,
    pub zoom: u8,
}

impl View {
    /// A view over a single extent at a fixed zoom.
    ///
    /// Crossing extents are split into their two halves.
    pub fn new(extent: Extent, zoom: u8) -> Self {
        let extent = extent.normalize_seam();
        let extents = if extent.crosses_antimeridian() {
            let (left, right) = split_extent(&extent);
            vec![left, right]
        } else {
            vec![extent]
        };
        Self { extents, zoom }
    }

    /// Returns true if the view is the two-piece antimeridian case.
    pub fn is_split(&self) -> bool {
        self.extents.len() == 2
    }
}

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// The region of the world (in global pixels at the view's zoom) a view covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelWindow {
    /// North-west corner
    pub origin: PixelPoint,
    pub width: f64,
    pub height: f64,
}

/// Splits a crossing extent into `[west, 180]` and `[-180, east]`.
pub fn split_extent(extent: &Extent) -> (Extent, Extent) {
    let left = Extent::new(extent.west, extent.south, MAX_LON, extent.north);
    let right = Extent::new(MIN_LON, extent.south, extent.east, extent.north);
    (left, right)
}

/// Splits a crossing extent and shares `width` between the halves in
/// proportion to their longitude spans.
pub fn split_antimeridian(extent: &Extent, width: f64) -> [(Extent, f64); 2] {
    let (left, right) = split_extent(extent);
    let total = left.lon_span() + right.lon_span();

    [
        (left, left.lon_span() / total * width),
        (right, right.lon_span() / total * width),
    ]
}

/// Picks zoom levels for extents and measures views.
#[derive(Debug, Clone, Copy)]
pub struct ViewResolver {
    projection: Projection,
    min_zoom: u8,
    max_zoom: u8,
}

impl ViewResolver {
    pub fn new(projection: Projection, min_zoom: u8, max_zoom: u8) -> Self {
        Self {
            projection,
            min_zoom,
            max_zoom,
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Chooses the smallest zoom whose projected extent is at least
    /// `target_width` × `target_height` pixels.
    ///
    /// The search starts at the configured minimum zoom and keeps going while
    /// the projected width OR the projected height is short of the target,
    /// stopping at the maximum zoom for degenerate extents. The returned view
    /// carries the original extent, not one snapped to tile boundaries.
    pub fn resolve(
        &self,
        extent: &Extent,
        target_width: u32,
        target_height: u32,
    ) -> Result<View, StitchError> {
        validate_extent(extent)?;
        self.resolve_scaled(
            &extent.normalize_seam(),
            target_width as f64,
            target_height as f64,
        )
    }

    /// A view at a caller-chosen zoom, after the same extent checks as
    /// [`resolve`](Self::resolve).
    pub fn view_at(&self, extent: &Extent, zoom: u8) -> Result<View, StitchError> {
        validate_extent(extent)?;
        let zoom = checked_zoom(zoom as i32)?;
        Ok(View::new(*extent, zoom))
    }

    fn resolve_scaled(
        &self,
        extent: &Extent,
        target_width: f64,
        target_height: f64,
    ) -> Result<View, StitchError> {
        if extent.crosses_antimeridian() {
            let [(left, left_width), (right, right_width)] =
                split_antimeridian(extent, target_width);

            let left_view = self.resolve_scaled(&left, left_width, target_height)?;
            let right_view = self.resolve_scaled(&right, right_width, target_height)?;

            if left_view.zoom != right_view.zoom {
                return Err(StitchError::InternalInvariant(format!(
                    "antimeridian halves of {} resolved to zoom {} and {}",
                    extent, left_view.zoom, right_view.zoom
                )));
            }

            return Ok(View {
                extents: vec![left, right],
                zoom: left_view.zoom,
            });
        }

        let mut zoom = self.min_zoom;
        loop {
            let window = self.extent_window(extent, zoom);
            if !(window.width < target_width || window.height < target_height) {
                break;
            }
            if zoom >= self.max_zoom {
                debug!(
                    extent = %extent,
                    target_width,
                    target_height,
                    zoom,
                    "Zoom search capped before reaching target size"
                );
                break;
            }
            zoom += 1;
        }

        Ok(View {
            extents: vec![*extent],
            zoom,
        })
    }

    /// The natural pixel size of a view at its zoom, at least 1×1.
    pub fn dimensions(&self, view: &View) -> Dimensions {
        let window = self.pixel_window(view);
        Dimensions {
            width: window.width.round().max(1.0) as u32,
            height: window.height.round().max(1.0) as u32,
        }
    }

    /// The global pixel window a view covers.
    ///
    /// For a split view the width runs from the first extent's west edge to
    /// the seam at 180°, then on from -180° to the second extent's east edge.
    pub fn pixel_window(&self, view: &View) -> PixelWindow {
        let first = view.extents[0];
        let last = view.extents[view.extents.len() - 1];

        let nw = self.projection.to_pixel(first.west, first.north, view.zoom);
        let se = self.projection.to_pixel(last.east, last.south, view.zoom);

        let width = if view.is_split() {
            let seam = self.projection.to_pixel(MAX_LON, first.north, view.zoom);
            (seam.x - nw.x) + se.x
        } else {
            se.x - nw.x
        };

        PixelWindow {
            origin: nw,
            width,
            height: se.y - nw.y,
        }
    }

    fn extent_window(&self, extent: &Extent, zoom: u8) -> PixelWindow {
        let nw = self.projection.to_pixel(extent.west, extent.north, zoom);
        let se = self.projection.to_pixel(extent.east, extent.south, zoom);
        PixelWindow {
            origin: nw,
            width: se.x - nw.x,
            height: se.y - nw.y,
        }
    }
}

fn validate_extent(extent: &Extent) -> Result<(), StitchError> {
    let values = [extent.west, extent.south, extent.east, extent.north];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StitchError::Config(format!(
            "extent {} contains non-finite values",
            extent
        )));
    }
    if !(MIN_LON..=MAX_LON).contains(&extent.west) || !(MIN_LON..=MAX_LON).contains(&extent.east)
    {
        return Err(StitchError::Config(format!(
            "extent {} has longitudes outside [-180, 180]",
            extent
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

    fn resolver() -> ViewResolver {
        ViewResolver::new(Projection::default(), DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }

    fn span(extent: &Extent, zoom: u8) -> (f64, f64) {
        let w = resolver().extent_window(extent, zoom);
        (w.width, w.height)
    }

    #[test]
    fn test_resolve_returns_original_extent() {
        let extent = Extent::new(-122.6, 37.6, -122.3, 37.9);
        let view = resolver().resolve(&extent, 800, 600).unwrap();
        assert_eq!(view.extents, vec![extent]);
    }

    #[test]
    fn test_resolve_is_minimal() {
        let extent = Extent::new(-122.6, 37.6, -122.3, 37.9);
        let view = resolver().resolve(&extent, 800, 600).unwrap();

        let (w, h) = span(&extent, view.zoom);
        assert!(w >= 800.0 && h >= 600.0);

        let (w, h) = span(&extent, view.zoom - 1);
        assert!(w < 800.0 || h < 600.0);
    }

    #[test]
    fn test_resolve_starts_at_min_zoom() {
        // The whole world is already 2048px wide at zoom 3
        let extent = Extent::new(-180.0, -85.0, 180.0, 85.0);
        let view = resolver().resolve(&extent, 100, 100).unwrap();
        assert_eq!(view.zoom, DEFAULT_MIN_ZOOM);
    }

    #[test]
    fn test_degenerate_extent_capped_at_max_zoom() {
        let extent = Extent::new(10.0, 10.0, 10.0, 10.0);
        let view = resolver().resolve(&extent, 10, 10).unwrap();
        assert_eq!(view.zoom, DEFAULT_MAX_ZOOM);
    }

    #[test]
    fn test_antimeridian_split() {
        let extent = Extent::new(170.0, -10.0, -170.0, 10.0);
        let view = resolver().resolve(&extent, 800, 600).unwrap();

        assert_eq!(view.extents.len(), 2);
        assert_eq!(view.extents[0], Extent::new(170.0, -10.0, 180.0, 10.0));
        assert_eq!(view.extents[1], Extent::new(-180.0, -10.0, -170.0, 10.0));

        // Both halves agree with resolving each half on its own share
        let left = resolver()
            .resolve_scaled(&view.extents[0], 400.0, 600.0)
            .unwrap();
        let right = resolver()
            .resolve_scaled(&view.extents[1], 400.0, 600.0)
            .unwrap();
        assert_eq!(left.zoom, view.zoom);
        assert_eq!(right.zoom, view.zoom);
    }

    #[test]
    fn test_antimeridian_widths_sum_to_target() {
        let extent = Extent::new(170.0, -10.0, -170.0, 10.0);
        let [(_, left), (_, right)] = split_antimeridian(&extent, 800.0);
        assert!((left + right - 800.0).abs() < 1e-9);
        assert!((left - 400.0).abs() < 1e-9);

        let uneven = Extent::new(175.0, -10.0, -165.0, 10.0);
        let [(_, left), (_, right)] = split_antimeridian(&uneven, 800.0);
        assert!((left - 200.0).abs() < 1e-9);
        assert!((right - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_rejects_bad_longitudes() {
        let extent = Extent::new(-190.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            resolver().resolve(&extent, 100, 100),
            Err(StitchError::Config(_))
        ));

        let extent = Extent::new(f64::NAN, 0.0, 10.0, 10.0);
        assert!(resolver().resolve(&extent, 100, 100).is_err());
    }

    #[test]
    fn test_dimensions_single_extent() {
        // The whole world at zoom 2 is 1024px square
        let view = View::new(Extent::new(-180.0, -85.05112878, 180.0, 85.05112878), 2);
        let dims = resolver().dimensions(&view);
        assert_eq!(dims, Dimensions { width: 1024, height: 1024 });
    }

    #[test]
    fn test_dimensions_never_zero() {
        let view = View::new(Extent::new(10.0, 10.0, 10.0001, 10.0001), 3);
        let dims = resolver().dimensions(&view);
        assert_eq!(dims, Dimensions { width: 1, height: 1 });
    }

    #[test]
    fn test_dimensions_split_view_spans_seam() {
        let view = View::new(Extent::new(90.0, -10.0, -90.0, 10.0), 2);
        assert!(view.is_split());

        // 90°E → 180° is a quarter of the world, -180° → 90°W another quarter
        let dims = resolver().dimensions(&view);
        assert_eq!(dims.width, 512);
    }

    #[test]
    fn test_edge_on_seam_does_not_split() {
        let extent = Extent::new(180.0, -10.0, -170.0, 10.0);
        let expected = vec![Extent::new(-180.0, -10.0, -170.0, 10.0)];

        let view = resolver().view_at(&extent, 3).unwrap();
        assert_eq!(view.extents, expected);

        let view = resolver().resolve(&extent, 100, 100).unwrap();
        assert!(!view.is_split());
        assert_eq!(view.extents, expected);

        let view = resolver()
            .resolve(&Extent::new(170.0, -10.0, -180.0, 10.0), 100, 100)
            .unwrap();
        assert_eq!(view.extents, vec![Extent::new(170.0, -10.0, 180.0, 10.0)]);
    }

    #[test]
    fn test_view_at_checks_zoom_and_extent() {
        let extent = Extent::new(170.0, -10.0, -170.0, 10.0);
        assert!(resolver().view_at(&extent, 4).unwrap().is_split());
        assert!(matches!(
            resolver().view_at(&extent, 30),
            Err(StitchError::Config(_))
        ));
        assert!(resolver()
            .view_at(&Extent::new(0.0, 0.0, 200.0, 1.0), 4)
            .is_err());
    }

    #[test]
    fn test_view_new_does_not_split_plain_extent() {
        let view = View::new(Extent::new(0.0, 0.0, 10.0, 10.0), 5);
        assert!(!view.is_split());
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_resolve_minimal_zoom(
                west in -179.0..0.0_f64,
                width_deg in 0.01..179.0_f64,
                south in -80.0..0.0_f64,
                height_deg in 0.01..80.0_f64,
                target_w in 1u32..4000,
                target_h in 1u32..4000
            ) {
                let extent = Extent::new(west, south, west + width_deg, south + height_deg);
                let view = resolver().resolve(&extent, target_w, target_h)?;
                let (w, h) = span(&extent, view.zoom);

                if view.zoom < DEFAULT_MAX_ZOOM {
                    prop_assert!(w >= target_w as f64 && h >= target_h as f64);
                }
                if view.zoom > DEFAULT_MIN_ZOOM {
                    let (w, h) = span(&extent, view.zoom - 1);
                    prop_assert!(w < target_w as f64 || h < target_h as f64);
                }
            }

            #[test]
            fn test_antimeridian_halves_agree(
                west in 100.0..179.9_f64,
                east in -179.9..-100.0_f64,
                target_w in 1u32..4000,
                target_h in 1u32..4000
            ) {
                let extent = Extent::new(west, -20.0, east, 20.0);
                let view = resolver().resolve(&extent, target_w, target_h);
                prop_assert!(view.is_ok(), "halves disagreed: {:?}", view);
            }
        }
    }
}
