use crate::reporter::{Reporter, TickStats, TracingReporter};
use crate::store::SampleStore;
use chrono::Utc;
use spy_config::SamplerConfig;
use spy_core::{CensusAdapter, Result, Snapshot, SpyError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// The store slot shared by the tick loop and every reader.
/// `None` while the sampler is stopped.
type SharedStore = Arc<Mutex<Option<SampleStore>>>;

const HALTED: &str = "sampling halted after a store invariant violation";

fn lock_store(store: &SharedStore) -> MutexGuard<'_, Option<SampleStore>> {
    // Mutation happens in one critical section per tick, so a poisoned lock
    // still guards a store that either finished or never started that tick.
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Stopped,
    Running,
    /// Started, but the tick loop aborted on a store invariant violation.
    /// The store is gone; only `stop` is left to do.
    Halted,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The census was merged and the tick timestamped.
    Merged(TickStats),
    /// The census failed; the store was left untouched.
    Skipped,
}

/// Periodically samples a [`CensusAdapter`] into a bounded [`SampleStore`].
///
/// `start` spawns the tick loop on the current Tokio runtime; `stop` waits
/// for any in-flight tick before discarding the store.  Readers obtained
/// through [`Sampler::reader`] stay valid across restarts.
pub struct Sampler {
    config:   SamplerConfig,
    adapter:  Arc<dyn CensusAdapter>,
    reporter: Arc<dyn Reporter>,
    store:    SharedStore,
    running:  Option<Running>,
}

struct Running {
    driver:   Arc<TickDriver>,
    shutdown: oneshot::Sender<()>,
    task:     JoinHandle<Result<()>>,
}

impl Sampler {
    /// Fails fast on a zero interval or history size.
    pub fn new(
        config: SamplerConfig,
        adapter: Arc<dyn CensusAdapter>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            adapter,
            reporter,
            store: Arc::new(Mutex::new(None)),
            running: None,
        })
    }

    /// Sampler reporting through `tracing`, tagged with `config.name`.
    pub fn with_tracing(config: SamplerConfig, adapter: Arc<dyn CensusAdapter>) -> Result<Self> {
        let reporter = Arc::new(TracingReporter::new(config.name.clone()));
        Self::new(config, adapter, reporter)
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn state(&self) -> SamplerState {
        match &self.running {
            None => SamplerState::Stopped,
            Some(running) if running.driver.is_halted() => SamplerState::Halted,
            Some(_) => SamplerState::Running,
        }
    }

    /// Begin ticking with a fresh, empty store.  Must be called inside a
    /// Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(SpyError::Lifecycle("sampler is already running".into()));
        }

        *lock_store(&self.store) = Some(SampleStore::try_new(self.config.history_size)?);

        let driver = Arc::new(TickDriver {
            adapter:  Arc::clone(&self.adapter),
            reporter: Arc::clone(&self.reporter),
            store:    Arc::clone(&self.store),
            gate:     tokio::sync::Mutex::new(()),
            halted:   watch::Sender::new(false),
        });
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(tick_loop(
            Arc::clone(&driver),
            self.config.interval(),
            shutdown_rx,
        ));

        self.reporter
            .started(self.config.interval(), self.config.history_size);
        self.running = Some(Running { driver, shutdown, task });
        Ok(())
    }

    /// Run one tick right now, serialized with the scheduled ones.
    pub async fn tick(&self) -> Result<TickOutcome> {
        let running = self
            .running
            .as_ref()
            .ok_or_else(|| SpyError::Lifecycle("sampler is not running".into()))?;
        running.driver.tick().await
    }

    /// Resolves once the tick loop has aborted on an invariant violation.
    /// Never resolves while stopped or while ticking normally.
    pub async fn halted(&self) {
        if let Some(running) = &self.running {
            let mut halted = running.driver.halted.subscribe();
            if halted.wait_for(|h| *h).await.is_ok() {
                return;
            }
        }
        std::future::pending().await
    }

    /// Cancel the schedule, wait for the in-flight tick and drop the store.
    ///
    /// Returns the error that aborted the tick loop, or a `Lifecycle` error
    /// when a manual tick halted sampling.
    pub async fn stop(&mut self) -> Result<()> {
        let running = self
            .running
            .take()
            .ok_or_else(|| SpyError::Lifecycle("sampler is not running".into()))?;

        // The loop may already have exited on its own.
        let _ = running.shutdown.send(());
        let outcome = running
            .task
            .await
            .unwrap_or_else(|e| Err(SpyError::Lifecycle(format!("tick loop panicked: {e}"))))
            .and_then(|()| {
                if running.driver.is_halted() {
                    Err(SpyError::Lifecycle(HALTED.into()))
                } else {
                    Ok(())
                }
            });

        *lock_store(&self.store) = None;
        self.reporter.stopped();
        outcome
    }

    /// Consistent copy of the store; `None` while stopped or halted.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.reader().snapshot()
    }

    /// Cheap handle for concurrent readers.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            store: Arc::clone(&self.store),
        }
    }
}

/// Read-only access to the sampler's store from any thread or task.
#[derive(Clone)]
pub struct SnapshotReader {
    store: SharedStore,
}

impl SnapshotReader {
    /// Either the complete pre-tick or the complete post-tick state, never a
    /// partial merge.  `None` while the sampler is stopped or halted.
    pub fn snapshot(&self) -> Option<Snapshot> {
        lock_store(&self.store).as_ref().map(SampleStore::snapshot)
    }
}

/// Everything one tick needs; shared by the loop and manual ticks.
struct TickDriver {
    adapter:  Arc<dyn CensusAdapter>,
    reporter: Arc<dyn Reporter>,
    store:    SharedStore,
    /// Held for a whole tick so ticks never overlap.
    gate:     tokio::sync::Mutex<()>,
    /// Flips to `true` once, on the first invariant violation.
    halted:   watch::Sender<bool>,
}

impl TickDriver {
    fn is_halted(&self) -> bool {
        *self.halted.borrow()
    }

    async fn tick(&self) -> Result<TickOutcome> {
        let _gate = self.gate.lock().await;
        if self.is_halted() {
            return Err(SpyError::Lifecycle(HALTED.into()));
        }

        // The census runs outside the store lock and off the executor.
        let adapter = Arc::clone(&self.adapter);
        let census = tokio::task::spawn_blocking(move || adapter.census())
            .await
            .unwrap_or_else(|e| Err(SpyError::Census(format!("census task failed: {e}"))));
        let census = match census {
            Ok(census) => census,
            Err(e) => {
                self.reporter.census_failed(&e);
                return Ok(TickOutcome::Skipped);
            }
        };

        let now = Utc::now().timestamp_millis();
        let applied = {
            let mut guard = lock_store(&self.store);
            let store = guard
                .as_mut()
                .ok_or_else(|| SpyError::Lifecycle("sample store was discarded".into()))?;
            let applied = store.apply_tick(&census, now).map(|merge| TickStats {
                census_types:  census.len(),
                tracked_types: store.tracked_types(),
                num_samples:   store.num_samples(),
                added:         merge.added,
                pruned:        merge.pruned,
            });
            if applied.is_err() {
                // Readers must never see the misaligned histories.
                *guard = None;
            }
            applied
        };

        match applied {
            Ok(stats) => {
                self.reporter.tick_completed(&stats);
                Ok(TickOutcome::Merged(stats))
            }
            Err(e) => {
                self.halted.send_replace(true);
                self.reporter.invariant_violated(&e);
                Err(e)
            }
        }
    }
}

/// First tick fires immediately; a tick that overruns pushes the schedule
/// back instead of bunching up missed ticks.
async fn tick_loop(
    driver: Arc<TickDriver>,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<()> {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(()), // stop() called or sampler dropped
            _ = ticker.tick() => {}
        }

        if let Err(e) = driver.tick().await {
            if e.is_fatal() || driver.is_halted() {
                return Err(e);
            }
            driver.reporter.tick_failed(&e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spy_core::Census;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Plays back queued results, then keeps returning `fallback`.
    struct ScriptedAdapter {
        script:   Mutex<VecDeque<Result<Census>>>,
        fallback: Census,
        calls:    AtomicUsize,
    }

    impl ScriptedAdapter {
        fn new(script: Vec<Result<Census>>, fallback: Census) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl CensusAdapter for ScriptedAdapter {
        fn name(&self) -> &str {
            "scripted"
        }

        fn census(&self) -> Result<Census> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn count(&self, prefix: &str) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.starts_with(prefix))
                .count()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl Reporter for RecordingReporter {
        fn started(&self, _interval: Duration, history_size: usize) {
            self.push(format!("started {history_size}"));
        }

        fn stopped(&self) {
            self.push("stopped".into());
        }

        fn tick_completed(&self, stats: &TickStats) {
            self.push(format!("tick {}", stats.num_samples));
        }

        fn census_failed(&self, error: &SpyError) {
            self.push(format!("census_failed {error}"));
        }

        fn invariant_violated(&self, error: &SpyError) {
            self.push(format!("invariant {error}"));
        }

        fn tick_failed(&self, error: &SpyError) {
            self.push(format!("tick_failed {error}"));
        }
    }

    /// Blocks inside `census` for `delay`, flagging when a call is underway.
    struct SlowAdapter {
        delay:    Duration,
        entered:  AtomicBool,
        finished: AtomicUsize,
    }

    impl CensusAdapter for SlowAdapter {
        fn name(&self) -> &str {
            "slow"
        }

        fn census(&self) -> Result<Census> {
            self.entered.store(true, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(census(&[("A", 1)]))
        }
    }

    /// Every call yields a different set of types, so each tick adds and
    /// prunes histories.
    #[derive(Default)]
    struct ChurningAdapter {
        calls: AtomicUsize,
    }

    impl CensusAdapter for ChurningAdapter {
        fn name(&self) -> &str {
            "churning"
        }

        fn census(&self) -> Result<Census> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..n % 6)
                .map(|i| (format!("T{}", (n + i) % 9), (i + 1) as u64))
                .collect())
        }
    }

    fn census(pairs: &[(&str, u64)]) -> Census {
        pairs.iter().map(|&(name, count)| (name, count)).collect()
    }

    fn driver(adapter: Arc<ScriptedAdapter>, reporter: Arc<RecordingReporter>) -> TickDriver {
        TickDriver {
            adapter,
            reporter,
            store: Arc::new(Mutex::new(Some(SampleStore::try_new(3).unwrap()))),
            gate: tokio::sync::Mutex::new(()),
            halted: watch::Sender::new(false),
        }
    }

    fn sampler(
        interval_ms: u64,
        adapter: Arc<ScriptedAdapter>,
        reporter: Arc<RecordingReporter>,
    ) -> Sampler {
        Sampler::new(SamplerConfig::new(interval_ms, 5), adapter, reporter).unwrap()
    }

    async fn wait_for(reader: &SnapshotReader, done: impl Fn(&Snapshot) -> bool) -> Snapshot {
        time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(snapshot) = reader.snapshot().filter(|s| done(s)) {
                    return snapshot;
                }
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("sampler never reached the expected state")
    }

    #[test]
    fn zero_history_size_is_rejected() {
        let adapter = ScriptedAdapter::new(vec![], Census::new());
        let reporter = Arc::new(RecordingReporter::default());
        let err = Sampler::new(SamplerConfig::new(1_000, 0), adapter, reporter)
            .err()
            .unwrap();
        assert!(matches!(err, SpyError::Config(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let adapter = ScriptedAdapter::new(vec![], Census::new());
        let reporter = Arc::new(RecordingReporter::default());
        let result = Sampler::new(SamplerConfig::new(0, 10), adapter, reporter);
        assert!(matches!(result, Err(SpyError::Config(_))));
    }

    #[tokio::test]
    async fn failed_census_leaves_no_trace() {
        let adapter = ScriptedAdapter::new(
            vec![
                Ok(census(&[("A", 1)])),
                Err(SpyError::Census("heap walk failed".into())),
                Ok(census(&[("A", 2), ("B", 4)])),
            ],
            Census::new(),
        );
        let reporter = Arc::new(RecordingReporter::default());
        let driver = driver(adapter, Arc::clone(&reporter));
        let read = || lock_store(&driver.store).as_ref().map(SampleStore::snapshot).unwrap();

        assert!(matches!(driver.tick().await.unwrap(), TickOutcome::Merged(_)));
        let after_first = read();

        assert_eq!(driver.tick().await.unwrap(), TickOutcome::Skipped);
        assert_eq!(read(), after_first);
        assert_eq!(reporter.count("census_failed"), 1);

        let TickOutcome::Merged(stats) = driver.tick().await.unwrap() else {
            panic!("third tick should merge");
        };
        assert_eq!(stats.num_samples, 2);
        assert_eq!(stats.added, 1);
        let snapshot = read();
        assert_eq!(snapshot.samples("A"), Some(&[1, 2][..]));
        assert_eq!(snapshot.samples("B"), Some(&[0, 4][..]));
    }

    #[tokio::test]
    async fn invariant_violation_halts_ticking() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1)]));
        let reporter = Arc::new(RecordingReporter::default());
        let driver = driver(adapter, Arc::clone(&reporter));

        driver.tick().await.unwrap();
        lock_store(&driver.store)
            .as_mut()
            .unwrap()
            .append_unaligned("A", 7);

        let err = driver.tick().await.unwrap_err();
        assert!(err.is_fatal());
        assert!(driver.is_halted());
        assert!(lock_store(&driver.store).is_none());
        assert_eq!(reporter.count("invariant"), 1);

        let err = driver.tick().await.unwrap_err();
        assert!(matches!(err, SpyError::Lifecycle(_)));
    }

    #[tokio::test]
    async fn halted_sampler_is_observable_and_serves_no_snapshot() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1)]));
        let reporter = Arc::new(RecordingReporter::default());
        // A window that never fills, so one extra sample always shows.
        let mut sampler = Sampler::new(
            SamplerConfig::new(5, 1_000),
            adapter,
            Arc::clone(&reporter) as Arc<dyn Reporter>,
        )
        .unwrap();
        let reader = sampler.reader();

        sampler.start().unwrap();
        wait_for(&reader, |s| s.num_samples() >= 2).await;
        lock_store(&sampler.store)
            .as_mut()
            .unwrap()
            .append_unaligned("A", 7);

        time::timeout(Duration::from_secs(5), sampler.halted())
            .await
            .expect("sampler never halted");
        assert_eq!(sampler.state(), SamplerState::Halted);
        assert!(sampler.snapshot().is_none());
        assert!(reader.snapshot().is_none());
        assert_eq!(reporter.count("invariant"), 1);
        assert!(matches!(sampler.tick().await, Err(SpyError::Lifecycle(_))));

        let err = sampler.stop().await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(sampler.state(), SamplerState::Stopped);
    }

    #[tokio::test]
    async fn loop_reports_non_fatal_tick_errors_and_keeps_going() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1)]));
        let reporter = Arc::new(RecordingReporter::default());
        let driver = Arc::new(driver(adapter, Arc::clone(&reporter)));
        *lock_store(&driver.store) = None;

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(tick_loop(
            Arc::clone(&driver),
            Duration::from_millis(5),
            shutdown_rx,
        ));
        time::timeout(Duration::from_secs(5), async {
            while reporter.count("tick_failed") < 2 {
                time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("loop stopped reporting failures");

        shutdown.send(()).unwrap();
        task.await.unwrap().unwrap();
        assert!(!driver.is_halted());
    }

    #[tokio::test]
    async fn halted_never_resolves_for_a_healthy_sampler() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1)]));
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = sampler(5, adapter, reporter);

        assert!(time::timeout(Duration::from_millis(30), sampler.halted())
            .await
            .is_err());
        sampler.start().unwrap();
        assert!(time::timeout(Duration::from_millis(50), sampler.halted())
            .await
            .is_err());
        assert_eq!(sampler.state(), SamplerState::Running);
        sampler.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_waits_for_the_in_flight_census() {
        let adapter = Arc::new(SlowAdapter {
            delay:    Duration::from_millis(300),
            entered:  AtomicBool::new(false),
            finished: AtomicUsize::new(0),
        });
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = Sampler::new(
            SamplerConfig::new(3_600_000, 5),
            Arc::clone(&adapter) as Arc<dyn CensusAdapter>,
            Arc::clone(&reporter) as Arc<dyn Reporter>,
        )
        .unwrap();

        sampler.start().unwrap();
        time::timeout(Duration::from_secs(5), async {
            while !adapter.entered.load(Ordering::SeqCst) {
                time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("census never started");

        sampler.stop().await.unwrap();
        assert_eq!(sampler.state(), SamplerState::Stopped);
        assert_eq!(adapter.finished.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.count("tick 1"), 1);
        assert!(sampler.snapshot().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn readers_never_see_a_partial_merge() {
        let adapter = Arc::new(ChurningAdapter::default());
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = Sampler::new(
            SamplerConfig::new(1, 4),
            Arc::clone(&adapter) as Arc<dyn CensusAdapter>,
            reporter as Arc<dyn Reporter>,
        )
        .unwrap();
        let reader = sampler.reader();
        sampler.start().unwrap();

        let checker = std::thread::spawn(move || {
            let mut checked = 0;
            while checked < 500 {
                if let Some(snapshot) = reader.snapshot() {
                    for (name, samples) in &snapshot.series {
                        assert_eq!(
                            samples.len(),
                            snapshot.num_samples(),
                            "{name} misaligned in a snapshot"
                        );
                    }
                    checked += 1;
                }
                std::thread::yield_now();
            }
        });

        tokio::task::spawn_blocking(move || checker.join())
            .await
            .unwrap()
            .expect("a snapshot was misaligned");
        assert!(adapter.calls.load(Ordering::SeqCst) >= 1);
        sampler.stop().await.unwrap();
    }

    #[tokio::test]
    async fn lifecycle_transitions_are_checked() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1)]));
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = sampler(3_600_000, adapter, Arc::clone(&reporter));

        assert_eq!(sampler.state(), SamplerState::Stopped);
        assert!(matches!(sampler.tick().await, Err(SpyError::Lifecycle(_))));
        assert!(matches!(sampler.stop().await, Err(SpyError::Lifecycle(_))));
        assert!(sampler.snapshot().is_none());

        sampler.start().unwrap();
        assert_eq!(sampler.state(), SamplerState::Running);
        assert!(matches!(sampler.start(), Err(SpyError::Lifecycle(_))));

        sampler.stop().await.unwrap();
        assert_eq!(sampler.state(), SamplerState::Stopped);
        assert!(sampler.snapshot().is_none());
        assert_eq!(reporter.count("started"), 1);
        assert_eq!(reporter.count("stopped"), 1);
    }

    #[tokio::test]
    async fn schedule_keeps_ticking_and_stays_aligned() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1), ("B", 2)]));
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = sampler(5, adapter, reporter);
        let reader = sampler.reader();

        sampler.start().unwrap();
        let snapshot = wait_for(&reader, |s| s.num_samples() >= 3).await;
        for name in ["A", "B"] {
            assert_eq!(snapshot.samples(name).unwrap().len(), snapshot.num_samples());
        }
        assert!(snapshot.num_samples() <= 5);

        sampler.stop().await.unwrap();
        assert!(reader.snapshot().is_none());
    }

    #[tokio::test]
    async fn census_failures_do_not_stop_the_schedule() {
        let adapter = ScriptedAdapter::new(
            vec![
                Err(SpyError::Census("first".into())),
                Err(SpyError::Census("second".into())),
            ],
            census(&[("A", 1)]),
        );
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = sampler(5, Arc::clone(&adapter), Arc::clone(&reporter));

        sampler.start().unwrap();
        wait_for(&sampler.reader(), |s| s.num_samples() >= 1).await;
        sampler.stop().await.unwrap();

        assert_eq!(reporter.count("census_failed"), 2);
        assert!(adapter.calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn restart_begins_with_an_empty_store() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1)]));
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = sampler(3_600_000, adapter, reporter);
        let reader = sampler.reader();

        sampler.start().unwrap();
        wait_for(&reader, |s| s.num_samples() == 1).await;
        sampler.tick().await.unwrap();
        assert_eq!(reader.snapshot().unwrap().num_samples(), 2);
        sampler.stop().await.unwrap();

        sampler.start().unwrap();
        let snapshot = wait_for(&reader, |s| s.num_samples() >= 1).await;
        assert_eq!(snapshot.num_samples(), 1);
        assert_eq!(snapshot.samples("A"), Some(&[1][..]));
        sampler.stop().await.unwrap();
    }

    #[tokio::test]
    async fn manual_tick_reports_merge_stats() {
        let adapter = ScriptedAdapter::new(vec![], census(&[("A", 1)]));
        let reporter = Arc::new(RecordingReporter::default());
        let mut sampler = sampler(3_600_000, adapter, Arc::clone(&reporter));
        let reader = sampler.reader();

        sampler.start().unwrap();
        wait_for(&reader, |s| s.num_samples() == 1).await;

        let outcome = sampler.tick().await.unwrap();
        let TickOutcome::Merged(stats) = outcome else {
            panic!("tick should merge");
        };
        assert_eq!(stats.num_samples, 2);
        assert_eq!(stats.tracked_types, 1);
        assert_eq!(stats.census_types, 1);
        assert_eq!(reporter.count("tick"), 2);

        let first = reader.snapshot();
        assert_eq!(first, reader.snapshot());
        sampler.stop().await.unwrap();
    }
}
