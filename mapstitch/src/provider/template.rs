//! Provider URL templates.
//!
//! A template is a tile URL with `{z}`, `{x}` and `{y}` placeholders, matched
//! case-insensitively:
//!
//! ```
//! use mapstitch::coord::TileCoord;
//! use mapstitch::provider::ProviderTemplate;
//!
//! let template = ProviderTemplate::parse("https://tiles.example/{Z}/{x}/{y}.png").unwrap();
//! assert_eq!(template.url_for(&TileCoord::new(3, 1, 2)), "https://tiles.example/3/1/2.png");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::coord::TileCoord;
use crate::error::StitchError;

fn zoom_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\{z\}").unwrap())
}

fn x_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\{x\}").unwrap())
}

fn y_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\{y\}").unwrap())
}

/// A validated tile URL template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderTemplate(String);

impl ProviderTemplate {
    /// Validates that `template` contains all three placeholders.
    pub fn parse(template: &str) -> Result<Self, StitchError> {
        let missing: Vec<&str> = [
            ("{z}", zoom_pattern()),
            ("{x}", x_pattern()),
            ("{y}", y_pattern()),
        ]
        .into_iter()
        .filter(|(_, pattern)| !pattern.is_match(template))
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(StitchError::Config(format!(
                "provider template '{}' is missing {}",
                template,
                missing.join(", ")
            )));
        }

        Ok(Self(template.to_string()))
    }

    /// Returns true if `value` looks like a template rather than a registry key.
    pub fn looks_like_template(value: &str) -> bool {
        zoom_pattern().is_match(value)
    }

    /// Substitutes the tile's coordinates into the template.
    pub fn url_for(&self, tile: &TileCoord) -> String {
        let url = zoom_pattern().replace_all(&self.0, tile.zoom.to_string().as_str());
        let url = x_pattern().replace_all(&url, tile.x.to_string().as_str());
        y_pattern()
            .replace_all(&url, tile.y.to_string().as_str())
            .into_owned()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds one URL per tile. `urls[i]` always corresponds to `tiles[i]`.
pub fn build_urls(template: &ProviderTemplate, tiles: &[TileCoord]) -> Vec<String> {
    tiles.iter().map(|tile| template.url_for(tile)).collect()
}
