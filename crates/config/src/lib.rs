pub mod schema;
pub mod watcher;

pub use schema::{
    CensusConfig, CensusSource, DemoConfig, ReportConfig, ReportFormat, SamplerConfig, SpyConfig,
};
pub use watcher::ConfigWatcher;

use spy_core::{Result, SpyError};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `SpyConfig::default()` if
/// the file doesn't exist; an unreadable, malformed or invalid file is an error.
pub fn load(path: impl AsRef<Path>) -> Result<SpyConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(SpyConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| SpyError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<SpyConfig> {
    let config: SpyConfig =
        toml::from_str(raw).map_err(|e| SpyError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("spy").join("spy.toml")
}
