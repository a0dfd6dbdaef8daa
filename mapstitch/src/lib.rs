//! MapStitch - map images from web-mercator tiles
//!
//! Turns a geographic bounding box plus a zoom or a pixel size into one
//! raster image assembled from remotely fetched `z/x/y` tiles. Boxes that
//! cross the ±180° antimeridian are split and stitched back together.
//!
//! # High-Level API
//!
//! The [`stitcher`] module provides the facade:
//!
//! ```ignore
//! use mapstitch::config::StitcherConfig;
//! use mapstitch::coord::Extent;
//! use mapstitch::provider::{AsyncReqwestClient, ProviderRegistry};
//! use mapstitch::stitcher::{RenderRequest, Sizing, Stitcher};
//!
//! let stitcher = Stitcher::new(StitcherConfig::default(), AsyncReqwestClient::new()?);
//! let template = ProviderRegistry::with_builtins().resolve("osm")?;
//! let request = RenderRequest {
//!     extent: Extent::new(-122.52, 37.70, -122.35, 37.83),
//!     sizing: Sizing::Size { width: 1500, height: 1000 },
//! };
//! let image = stitcher.render(&template, &request).await?;
//! ```

pub mod composite;
pub mod config;
pub mod coord;
pub mod crop;
pub mod encode;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod logging;
pub mod provider;
pub mod request;
pub mod stitcher;
pub mod view;
