//! spy: samples live-object counts by type and keeps a bounded history of them.
//!
//! Run with:  `RUST_LOG=info spy [path/to/spy.toml]`

mod demo;
mod report;

use anyhow::Result;
use spy_census::{InstanceRegistry, ProcessCensus};
use spy_config::{CensusSource, ConfigWatcher, SpyConfig};
use spy_core::CensusAdapter;
use spy_sampler::Sampler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Interval};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("spy v{} starting", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(spy_config::default_path);
    let registry = InstanceRegistry::new();
    let mut service = Service::start(spy_config::load(&path)?, &registry)?;

    let (_watcher, mut reloads) = ConfigWatcher::spawn(&path);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; shutting down");
                break;
            }
            _ = service.sampler.halted() => {
                error!("Sampler halted; shutting down");
                break;
            }
            Some(()) = reloads.recv() => {
                service = service.reload(&path, &registry).await?;
            }
            _ = next_report(&mut service.report_ticker) => {
                report::log(service.sampler.snapshot().as_ref(), &service.config.report);
            }
        }
    }

    service.stop().await
}

/// A running sampler plus everything started alongside it.
struct Service {
    config:        SpyConfig,
    sampler:       Sampler,
    demo:          Option<JoinHandle<()>>,
    report_ticker: Option<Interval>,
}

impl Service {
    fn start(config: SpyConfig, registry: &InstanceRegistry) -> Result<Self> {
        let adapter: Arc<dyn CensusAdapter> = match config.census.source {
            CensusSource::Process => Arc::new(ProcessCensus::new()),
            CensusSource::Registry => Arc::new(registry.clone()),
        };
        info!("Sampling the {} census", adapter.name());

        let mut sampler = Sampler::with_tracing(config.sampler.clone(), adapter)?;
        sampler.start()?;

        let demo = config
            .demo
            .enabled
            .then(|| demo::spawn(registry.clone(), config.demo.clone()));
        if demo.is_some() && config.census.source != CensusSource::Registry {
            warn!("Demo objects are only visible with census.source = \"registry\"");
        }

        let report_ticker = (config.report.interval_ms > 0).then(|| {
            let period = Duration::from_millis(config.report.interval_ms);
            time::interval_at(time::Instant::now() + period, period)
        });

        Ok(Self {
            config,
            sampler,
            demo,
            report_ticker,
        })
    }

    /// Restart with the file's new contents; history starts over.  A file
    /// that fails to load leaves the current service running.
    async fn reload(self, path: &Path, registry: &InstanceRegistry) -> Result<Self> {
        let config = match spy_config::load(path) {
            Ok(config) if config == self.config => {
                debug!("Config unchanged; keeping the running sampler");
                return Ok(self);
            }
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config reload: {e}");
                return Ok(self);
            }
        };

        info!("Config changed; restarting sampler");
        self.stop().await?;
        Self::start(config, registry)
    }

    async fn stop(mut self) -> Result<()> {
        if let Some(demo) = self.demo.take() {
            demo.abort();
        }
        self.sampler.stop().await?;
        Ok(())
    }
}

async fn next_report(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
