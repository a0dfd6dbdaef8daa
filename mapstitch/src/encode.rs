//! Image encoding for stitched output.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::StitchError;

/// Default JPEG quality (0-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Output encodings supported for stitched images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg { quality: u8 },
}

impl OutputFormat {
    pub fn jpeg() -> Self {
        OutputFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Infers the format from a file extension (`png`, `jpg`, `jpeg`,
    /// case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::jpeg()),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Serializes an image.
///
/// JPEG has no alpha channel, so transparent areas come out black.
pub fn encode(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, StitchError> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Png => image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| StitchError::Encode(e.to_string()))?,
        OutputFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
                .map_err(|e| StitchError::Encode(e.to_string()))?;
        }
    }

    Ok(buffer)
}
