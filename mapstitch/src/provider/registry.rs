//! Provider registry: maps short keys (the `p` query parameter) to templates.

use std::collections::BTreeMap;

use super::template::ProviderTemplate;
use crate::error::StitchError;

/// Templates available without any configuration.
const BUILTIN_PROVIDERS: &[(&str, &str)] = &[
    ("osm", "https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
    ("opentopomap", "https://tile.opentopomap.org/{z}/{x}/{y}.png"),
    (
        "esri-imagery",
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
    ),
];

/// Immutable key → template lookup table.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, ProviderTemplate>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in providers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (key, template) in BUILTIN_PROVIDERS {
            // Built-in templates are known to be valid
            if let Ok(parsed) = ProviderTemplate::parse(template) {
                registry.providers.insert(key.to_string(), parsed);
            }
        }
        registry
    }

    /// Creates the built-in registry overlaid with configured entries.
    pub fn from_config<'a, I>(entries: I) -> Result<Self, StitchError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut registry = Self::with_builtins();
        for (key, template) in entries {
            registry.insert(key, template)?;
        }
        Ok(registry)
    }

    /// Adds or replaces a provider.
    pub fn insert(&mut self, key: &str, template: &str) -> Result<(), StitchError> {
        let parsed = ProviderTemplate::parse(template)?;
        self.providers.insert(key.to_string(), parsed);
        Ok(())
    }

    /// Looks up a provider by key.
    pub fn get(&self, key: &str) -> Option<&ProviderTemplate> {
        self.providers.get(key)
    }

    /// Resolves either a registry key or a literal template.
    pub fn resolve(&self, key_or_template: &str) -> Result<ProviderTemplate, StitchError> {
        if let Some(template) = self.get(key_or_template) {
            return Ok(template.clone());
        }
        if ProviderTemplate::looks_like_template(key_or_template) {
            return ProviderTemplate::parse(key_or_template);
        }
        Err(StitchError::Config(format!(
            "No such provider: {}",
            key_or_template
        )))
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
