//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module is the single place where INI key names are mapped to struct
//! fields.

use ini::Ini;
use image::Rgba;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [stitch] section
    if let Some(section) = ini.section(Some("stitch")) {
        let mut stitch = config.stitch.clone();

        if let Some(v) = section.get("tile_size") {
            let size: u32 = parse_number("stitch", "tile_size", v)?;
            if size == 0 {
                return Err(invalid("stitch", "tile_size", v, "must be greater than 0"));
            }
            stitch = stitch.with_tile_size(size);
        }
        if let Some(v) = section.get("max_tiles") {
            stitch = stitch.with_max_tiles(parse_number("stitch", "max_tiles", v)?);
        }
        if let Some(v) = section.get("max_concurrent_fetches") {
            let max: usize = parse_number("stitch", "max_concurrent_fetches", v)?;
            if max == 0 {
                return Err(invalid(
                    "stitch",
                    "max_concurrent_fetches",
                    v,
                    "must be greater than 0",
                ));
            }
            stitch = stitch.with_max_concurrent_fetches(max);
        }

        let min_zoom = match section.get("min_zoom") {
            Some(v) => parse_number("stitch", "min_zoom", v)?,
            None => stitch.min_zoom(),
        };
        let max_zoom = match section.get("max_zoom") {
            Some(v) => parse_number("stitch", "max_zoom", v)?,
            None => stitch.max_zoom(),
        };
        stitch = stitch.with_zoom_bounds(min_zoom, max_zoom);
        if stitch.max_zoom() > crate::coord::MAX_ZOOM {
            let key = if min_zoom > max_zoom { "min_zoom" } else { "max_zoom" };
            return Err(invalid(
                "stitch",
                key,
                &stitch.max_zoom().to_string(),
                "exceeds the largest supported zoom",
            ));
        }

        if let Some(v) = section.get("background_color") {
            let v = v.trim();
            if !v.is_empty() {
                let color = parse_color(v).ok_or_else(|| {
                    invalid("stitch", "background_color", v, "expected rrggbb or rrggbbaa")
                })?;
                stitch = stitch.with_background_color(Some(color));
            }
        }
        if let Some(v) = section.get("placeholder_color") {
            let color = parse_color(v.trim()).ok_or_else(|| {
                invalid("stitch", "placeholder_color", v, "expected rrggbb or rrggbbaa")
            })?;
            stitch = stitch.with_placeholder_color(color);
        }

        config.stitch = stitch;
    }

    // [http] section
    if let Some(section) = ini.section(Some("http")) {
        if let Some(v) = section.get("timeout") {
            config.http.timeout_secs = parse_number("http", "timeout", v)?;
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if !v.is_empty() {
                config.http.user_agent = v.to_string();
            }
        }
        if let Some(v) = section.get("pool_max_idle_per_host") {
            config.http.pool_max_idle_per_host =
                parse_number("http", "pool_max_idle_per_host", v)?;
        }
    }

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("bind") {
            let v = v.trim();
            if v.parse::<std::net::SocketAddr>().is_err() {
                return Err(invalid("server", "bind", v, "expected host:port"));
            }
            config.server.bind = v.to_string();
        }
        if let Some(v) = section.get("default_width") {
            config.server.default_width = parse_number("server", "default_width", v)?;
        }
        if let Some(v) = section.get("default_height") {
            config.server.default_height = parse_number("server", "default_height", v)?;
        }
    }

    // [providers] section: key = template
    if let Some(section) = ini.section(Some("providers")) {
        for (key, template) in section.iter() {
            let template = template.trim();
            if let Err(e) = crate::provider::ProviderTemplate::parse(template) {
                return Err(invalid("providers", key, template, &e.to_string()));
            }
            config.providers.insert(key.to_string(), template.to_string());
        }
    }

    Ok(config)
}

/// Parses `rrggbb` or `rrggbbaa` hex colors, with an optional leading `#`.
///
/// INI files should omit the `#`, which some readers treat as a comment.
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };

    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

fn parse_number<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a non-negative integer"))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
