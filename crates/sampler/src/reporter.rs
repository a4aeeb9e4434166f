use spy_core::SpyError;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Outcome of one successful tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Distinct types in this tick's census.
    pub census_types:  usize,
    /// Types tracked after merging and pruning.
    pub tracked_types: usize,
    /// Ticks held in the window after this one.
    pub num_samples:   usize,
    pub added:         usize,
    pub pruned:        usize,
}

/// Observability sink handed to the sampler at construction.
///
/// Every sampler event goes through here; implementations decide where it
/// ends up.
pub trait Reporter: Send + Sync {
    fn started(&self, interval: Duration, history_size: usize);

    fn stopped(&self);

    fn tick_completed(&self, stats: &TickStats);

    /// The census failed; the tick was skipped.
    fn census_failed(&self, error: &SpyError);

    /// The store lost alignment; the tick loop is about to abort.
    fn invariant_violated(&self, error: &SpyError);

    /// A scheduled tick failed for a reason other than the census.
    fn tick_failed(&self, error: &SpyError);
}

/// [`Reporter`] emitting `tracing` events tagged with the service name.
#[derive(Debug, Clone)]
pub struct TracingReporter {
    system: String,
}

impl TracingReporter {
    pub fn new(system: impl Into<String>) -> Self {
        let system = system.into();
        Self {
            system: if system.is_empty() { "-".to_string() } else { system },
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }
}

impl Reporter for TracingReporter {
    fn started(&self, interval: Duration, history_size: usize) {
        info!(
            system = %self.system,
            interval_ms = interval.as_millis() as u64,
            history_size,
            "Starting object sampler"
        );
    }

    fn stopped(&self) {
        info!(system = %self.system, "Stopping object sampler");
    }

    fn tick_completed(&self, stats: &TickStats) {
        debug!(
            system = %self.system,
            tracked = stats.tracked_types,
            samples = stats.num_samples,
            added = stats.added,
            pruned = stats.pruned,
            "Tracking {} object types in {} samples",
            stats.tracked_types,
            stats.num_samples
        );
    }

    fn census_failed(&self, error: &SpyError) {
        warn!(system = %self.system, "Error while updating object stats: {error}");
    }

    fn invariant_violated(&self, error: &SpyError) {
        error!(system = %self.system, "Sample store corrupted, sampling halted: {error}");
    }

    fn tick_failed(&self, error: &SpyError) {
        warn!(system = %self.system, "Tick failed: {error}");
    }
}
