//! Query-string contract of the HTTP front end.
//!
//! Two routes share the same parameters:
//!
//! | Route     | Sizing                                  |
//! |-----------|-----------------------------------------|
//! | `/`       | `zoom` required, natural output size    |
//! | `/mapimg` | `w` × `h` (defaults apply), zoom chosen |
//!
//! `extent` is `south:west:north:east` in degrees and `p` is a provider key.
//! The provider is checked first, so a request with both an unknown provider
//! and a bad extent answers 404.

use serde::Deserialize;
use thiserror::Error;

use crate::coord::{Extent, MAX_ZOOM};
use crate::provider::{ProviderRegistry, ProviderTemplate};
use crate::stitcher::{RenderRequest, Sizing};

/// Raw query parameters. Everything is kept as text so malformed values can
/// be reported with the contract's status codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StitchQuery {
    pub extent: Option<String>,
    pub zoom: Option<String>,
    pub w: Option<String>,
    pub h: Option<String>,
    pub p: Option<String>,
}

/// A request the front end refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("'extent' is required")]
    MissingExtent,

    #[error("invalid extent '{0}': expected south:west:north:east")]
    InvalidExtent(String),

    #[error("invalid zoom '{0}': expected an integer between 0 and {}", MAX_ZOOM)]
    InvalidZoom(String),

    #[error("No such provider: {0}")]
    UnknownProvider(String),
}

impl RequestError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::UnknownProvider(_) => 404,
            _ => 400,
        }
    }
}

/// Sizes used by `/mapimg` when `w` or `h` are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSize {
    pub width: u32,
    pub height: u32,
}

/// Parses `south:west:north:east`.
///
/// Extra fields after the fourth are ignored.
pub fn parse_extent_param(value: &str) -> Result<Extent, RequestError> {
    let invalid = || RequestError::InvalidExtent(value.to_string());

    let parts = value
        .splitn(5, ':')
        .take(4)
        .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<f64>, _>>()?;

    let [south, west, north, east] = parts[..] else {
        return Err(invalid());
    };
    if parts.iter().any(|v| !v.is_finite()) {
        return Err(invalid());
    }

    Ok(Extent::from_south_west_north_east(south, west, north, east))
}

fn parse_zoom_param(value: Option<&str>) -> Result<u8, RequestError> {
    let value = value.unwrap_or_default();
    match value.trim().parse::<i64>() {
        Ok(zoom) if (0..=MAX_ZOOM as i64).contains(&zoom) => Ok(zoom as u8),
        _ => Err(RequestError::InvalidZoom(value.to_string())),
    }
}

/// A missing, non-numeric or zero size falls back to the default.
fn parse_size_param(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn lookup_provider(
    query: &StitchQuery,
    registry: &ProviderRegistry,
) -> Result<ProviderTemplate, RequestError> {
    let key = query.p.as_deref().unwrap_or_default();
    registry
        .get(key)
        .cloned()
        .ok_or_else(|| RequestError::UnknownProvider(key.to_string()))
}

fn extent_of(query: &StitchQuery) -> Result<Extent, RequestError> {
    let value = query.extent.as_deref().ok_or(RequestError::MissingExtent)?;
    parse_extent_param(value)
}

/// Interprets a `/` request: explicit zoom, natural size.
pub fn zoom_request(
    query: &StitchQuery,
    registry: &ProviderRegistry,
) -> Result<(ProviderTemplate, RenderRequest), RequestError> {
    let template = lookup_provider(query, registry)?;
    let extent = extent_of(query)?;
    let zoom = parse_zoom_param(query.zoom.as_deref())?;

    Ok((
        template,
        RenderRequest {
            extent,
            sizing: Sizing::Zoom(zoom),
        },
    ))
}

/// Interprets a `/mapimg` request: explicit (or default) size.
pub fn size_request(
    query: &StitchQuery,
    registry: &ProviderRegistry,
    defaults: DefaultSize,
) -> Result<(ProviderTemplate, RenderRequest), RequestError> {
    let template = lookup_provider(query, registry)?;
    let extent = extent_of(query)?;

    Ok((
        template,
        RenderRequest {
            extent,
            sizing: Sizing::Size {
                width: parse_size_param(query.w.as_deref(), defaults.width),
                height: parse_size_param(query.h.as_deref(), defaults.height),
            },
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: DefaultSize = DefaultSize {
        width: 1500,
        height: 1000,
    };

    fn query(extent: Option<&str>, p: Option<&str>) -> StitchQuery {
        StitchQuery {
            extent: extent.map(str::to_string),
            p: p.map(str::to_string),
            ..StitchQuery::default()
        }
    }

    #[test]
    fn test_extent_reordered_to_west_south_east_north() {
        let extent = parse_extent_param("37.7:-122.5:37.8:-122.4").unwrap();
        assert_eq!(extent, Extent::new(-122.5, 37.7, -122.4, 37.8));
    }

    #[test]
    fn test_malformed_extents() {
        for bad in ["", "1:2:3", "a:b:c:d", "1:2:3:NaN", "1::3:4"] {
            assert_eq!(
                parse_extent_param(bad),
                Err(RequestError::InvalidExtent(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_missing_extent_is_400() {
        let registry = ProviderRegistry::with_builtins();
        let err = size_request(&query(None, Some("osm")), &registry, DEFAULTS).unwrap_err();
        assert_eq!(err, RequestError::MissingExtent);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_unknown_provider_is_404_and_checked_first() {
        let registry = ProviderRegistry::with_builtins();
        let err = size_request(&query(None, Some("nope")), &registry, DEFAULTS).unwrap_err();
        assert_eq!(err, RequestError::UnknownProvider("nope".to_string()));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "No such provider: nope");
    }

    #[test]
    fn test_zoom_request() {
        let registry = ProviderRegistry::with_builtins();
        let mut q = query(Some("0:0:10:10"), Some("osm"));
        q.zoom = Some("7".to_string());

        let (template, request) = zoom_request(&q, &registry).unwrap();
        assert_eq!(&template, registry.get("osm").unwrap());
        assert_eq!(request.sizing, Sizing::Zoom(7));
    }

    #[test]
    fn test_bad_zoom_is_400() {
        let registry = ProviderRegistry::with_builtins();
        for zoom in [None, Some("-1"), Some("abc"), Some("25")] {
            let mut q = query(Some("0:0:10:10"), Some("osm"));
            q.zoom = zoom.map(str::to_string);
            let err = zoom_request(&q, &registry).unwrap_err();
            assert!(matches!(err, RequestError::InvalidZoom(_)));
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_size_request_defaults() {
        let registry = ProviderRegistry::with_builtins();
        let mut q = query(Some("0:0:10:10"), Some("osm"));
        q.w = Some("640".to_string());
        q.h = Some("zero".to_string());

        let (_, request) = size_request(&q, &registry, DEFAULTS).unwrap();
        assert_eq!(
            request.sizing,
            Sizing::Size {
                width: 640,
                height: 1000
            }
        );
    }
}
