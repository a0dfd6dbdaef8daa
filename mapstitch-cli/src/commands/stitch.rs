//! `mapstitch stitch`: render an extent at a fixed zoom into an image file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use mapstitch::config::ConfigFile;
use mapstitch::coord::Extent;
use mapstitch::encode::{encode, OutputFormat};
use mapstitch::stitcher::{RenderRequest, Sizing};
use tracing::info;

use super::common::{build_stitcher, provider_registry};
use crate::error::CliError;

/// Output format selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    /// PNG (keeps transparency)
    Png,
    /// JPEG
    Jpeg,
}

#[derive(Debug, Args)]
pub struct StitchArgs {
    /// Zoom level
    #[arg(long, short)]
    pub zoom: u8,

    /// Provider key (see config [providers]) or a URL template with {z}/{x}/{y}
    #[arg(long, short)]
    pub provider: String,

    /// Output file path (format is detected from .png/.jpg/.jpeg)
    #[arg(long, short, default_value = "out.jpg")]
    pub output: PathBuf,

    /// Output format (overrides the file extension)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = mapstitch::encode::DEFAULT_JPEG_QUALITY)]
    pub quality: u8,

    /// Extent as MINX MINY MAXX MAXY in degrees, in either order
    #[arg(
        num_args = 4,
        required = true,
        allow_negative_numbers = true,
        value_names = ["MINX", "MINY", "MAXX", "MAXY"]
    )]
    pub extent: Vec<String>,
}

/// Parses the four extent numbers. Trailing commas are stripped so
/// `-122.5, 37.7, -122.3, 37.9` pasted from elsewhere works.
pub fn parse_extent_args(values: &[String]) -> Result<Extent, CliError> {
    let numbers = values
        .iter()
        .map(|v| {
            v.trim().trim_end_matches(',').parse::<f64>().map_err(|_| {
                CliError::InvalidArgument(format!("'{}' is not a coordinate", v))
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    match numbers[..] {
        [x1, y1, x2, y2] => Ok(Extent::from_corners(x1, y1, x2, y2)),
        _ => Err(CliError::InvalidArgument(format!(
            "expected 4 extent values, got {}",
            numbers.len()
        ))),
    }
}

fn output_format(args: &StitchArgs) -> Result<OutputFormat, CliError> {
    let format = match args.format {
        Some(FormatArg::Png) => OutputFormat::Png,
        Some(FormatArg::Jpeg) => OutputFormat::jpeg(),
        None => OutputFormat::from_path(&args.output).ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "cannot infer image format from '{}'; use --format",
                args.output.display()
            ))
        })?,
    };

    Ok(match format {
        OutputFormat::Jpeg { .. } => OutputFormat::Jpeg {
            quality: args.quality,
        },
        png => png,
    })
}

/// Run the stitch command.
pub async fn run(args: StitchArgs, config: &ConfigFile) -> Result<(), CliError> {
    let extent = parse_extent_args(&args.extent)?;
    let format = output_format(&args)?;

    let template = provider_registry(config)?.resolve(&args.provider)?;
    let stitcher = build_stitcher(config)?;

    let view = stitcher.view_at(&extent, args.zoom)?;
    let grid = stitcher.tile_grid(&view)?;
    println!("Fetching {} tiles...", grid.len());

    let request = RenderRequest {
        extent,
        sizing: Sizing::Zoom(args.zoom),
    };
    let image = stitcher.render(&template, &request).await?;
    let bytes = encode(&image, format)?;

    fs::write(&args.output, &bytes).map_err(|error| CliError::FileWrite {
        path: args.output.display().to_string(),
        error,
    })?;

    info!(
        path = %args.output.display(),
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "Image written"
    );
    println!(
        "Wrote {}x{} image to {}",
        image.width(),
        image.height(),
        args.output.display()
    );

    Ok(())
}
