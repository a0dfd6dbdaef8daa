//! Cutting the requested area out of a composite surface.
//!
//! A composite covers whole tiles, so it is usually larger than the view it
//! was built for. [`crop`] reads exactly the view's pixel window out of it
//! and scales that window to the requested size. [`crop_to_center`] and
//! [`resize`] are plain size adjustments with no geographic meaning.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::error::StitchError;
use crate::view::{View, ViewResolver};

pub(crate) const FILTER: FilterType = FilterType::Triangle;

/// Extracts the view's pixel window from `surface` and scales it into a new
/// `width` × `height` image.
///
/// The window starts at `(nw.x mod T, nw.y mod T)` inside the surface, where
/// `nw` is the view's north-west corner in global pixels. For a split view
/// the window runs across the seam between the two halves of the surface.
/// When the window already has the requested size the pixels are copied
/// unscaled.
pub fn crop(
    surface: &RgbaImage,
    resolver: &ViewResolver,
    view: &View,
    width: u32,
    height: u32,
) -> Result<RgbaImage, StitchError> {
    check_target(width, height)?;
    check_source(surface)?;

    let tile = resolver.projection().tile_size() as f64;
    let window = resolver.pixel_window(view);

    let x = (window.origin.x % tile).round() as u32;
    let y = (window.origin.y % tile).round() as u32;
    let x = x.min(surface.width().saturating_sub(1));
    let y = y.min(surface.height().saturating_sub(1));

    let src_w = (window.width.round() as u32).clamp(1, surface.width() - x);
    let src_h = (window.height.round() as u32).clamp(1, surface.height() - y);

    let source = imageops::crop_imm(surface, x, y, src_w, src_h).to_image();

    debug!(
        src_x = x,
        src_y = y,
        src_w,
        src_h,
        width,
        height,
        "Cropping composite"
    );

    if (src_w, src_h) == (width, height) {
        return Ok(source);
    }
    Ok(imageops::resize(&source, width, height, FILTER))
}

/// Takes the centered `width` × `height` region of `surface` without scaling.
///
/// A surface smaller than the target ends up centered on a transparent
/// background.
pub fn crop_to_center(
    surface: &RgbaImage,
    width: u32,
    height: u32,
) -> Result<RgbaImage, StitchError> {
    check_target(width, height)?;

    let mut target = RgbaImage::new(width, height);
    let x = (width as i64 - surface.width() as i64) / 2;
    let y = (height as i64 - surface.height() as i64) / 2;
    imageops::replace(&mut target, surface, x, y);
    Ok(target)
}

/// Scales `surface` to cover `width` × `height` keeping its aspect ratio,
/// then trims the overflow equally from both sides.
pub fn resize(surface: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, StitchError> {
    check_target(width, height)?;
    check_source(surface)?;

    let scale = f64::max(
        width as f64 / surface.width() as f64,
        height as f64 / surface.height() as f64,
    );
    let scaled_w = ((surface.width() as f64 * scale).ceil() as u32).max(width);
    let scaled_h = ((surface.height() as f64 * scale).ceil() as u32).max(height);

    let scaled = imageops::resize(surface, scaled_w, scaled_h, FILTER);
    crop_to_center(&scaled, width, height)
}

fn check_target(width: u32, height: u32) -> Result<(), StitchError> {
    if width == 0 || height == 0 {
        return Err(StitchError::Config(format!(
            "target size {}x{} must be non-zero",
            width, height
        )));
    }
    Ok(())
}

fn check_source(surface: &RgbaImage) -> Result<(), StitchError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(StitchError::Config("source image is empty".to_string()));
    }
    Ok(())
}
