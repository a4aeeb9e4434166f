use serde::{Deserialize, Serialize};
use spy_core::{Result, SpyError};
use std::time::Duration;

/// Root configuration structure parsed from `spy.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyConfig {
    /// Tick interval and history window.
    pub sampler: SamplerConfig,
    /// Which census adapter feeds the sampler.
    pub census: CensusConfig,
    /// Periodic summary logged by the binary.
    pub report: ReportConfig,
    /// Demo object generator (registry census only).
    pub demo: DemoConfig,
}

impl SpyConfig {
    /// Reject settings the sampler cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;
        if self.demo.enabled && self.demo.interval_ms == 0 {
            return Err(SpyError::Config("demo.interval_ms must be > 0".into()));
        }
        Ok(())
    }
}

/// Sampling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Service name attached to every log event from the sampler.
    pub name: String,
    /// Time between ticks in milliseconds.
    pub interval_ms: u64,
    /// Samples kept per type (the history window).
    pub history_size: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            name:         "objectbrowser".to_string(),
            interval_ms:  5_000,
            history_size: 200,
        }
    }
}

impl SamplerConfig {
    pub fn new(interval_ms: u64, history_size: usize) -> Self {
        Self {
            interval_ms,
            history_size,
            ..Self::default()
        }
    }

    /// Both the interval and the window must be positive; neither is ever
    /// silently replaced by a default.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(SpyError::Config("sampler.interval_ms must be > 0".into()));
        }
        if self.history_size == 0 {
            return Err(SpyError::Config("sampler.history_size must be > 0".into()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Census adapter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    pub source: CensusSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CensusSource {
    /// Live OS processes grouped by executable name.
    #[default]
    Process,
    /// Objects registered with the in-process instance registry.
    Registry,
}

/// Summary report settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Milliseconds between reports; `0` disables reporting.
    pub interval_ms: u64,
    /// Types listed per report, busiest first.
    pub top: usize,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            top:         10,
            format:      ReportFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Keeps a varying number of tracked objects alive so the registry census
/// has something to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub enabled:     bool,
    pub interval_ms: u64,
    pub max_objects: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled:     false,
            interval_ms: 6_000,
            max_objects: 300,
        }
    }
}
