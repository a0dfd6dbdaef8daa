//! Common helpers shared across CLI commands.

use std::path::Path;

use mapstitch::config::ConfigFile;
use mapstitch::provider::{AsyncReqwestClient, ProviderRegistry};
use mapstitch::stitcher::Stitcher;

use crate::error::CliError;

/// Loads the config file given on the command line, or the default one.
///
/// A missing default file yields defaults; a missing explicit file is an
/// error.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) if !path.exists() => Err(CliError::Config(format!(
            "config file '{}' does not exist",
            path.display()
        ))),
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}

/// Built-in providers overlaid with the `[providers]` section.
pub fn provider_registry(config: &ConfigFile) -> Result<ProviderRegistry, CliError> {
    Ok(ProviderRegistry::from_config(&config.providers)?)
}

/// A stitcher over a pooled reqwest client configured from `[http]`.
pub fn build_stitcher(config: &ConfigFile) -> Result<Stitcher<AsyncReqwestClient>, CliError> {
    let client = AsyncReqwestClient::from_config(&config.http)?;
    Ok(Stitcher::new(config.stitch.clone(), client))
}
