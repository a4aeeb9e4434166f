use crate::history::BoundedHistory;
use spy_core::{Census, Result, Snapshot, SpyError};
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// What one merge changed in the set of tracked types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Types seen for the first time this tick.
    pub added:  usize,
    /// Types dropped because their whole window was zero.
    pub pruned: usize,
}

/// Per-type sample histories kept in lock-step with one timestamp history.
///
/// After every complete tick (`merge` then `record_timestamp`) each tracked
/// history holds exactly [`SampleStore::num_samples`] samples.
#[derive(Debug, Clone)]
pub struct SampleStore {
    capacity:   NonZeroUsize,
    history:    HashMap<String, BoundedHistory<u64>>,
    timestamps: BoundedHistory<i64>,
}

impl SampleStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            history: HashMap::new(),
            timestamps: BoundedHistory::new(capacity),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or_else(|| SpyError::Config("sample history size must be > 0".into()))
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Ticks recorded in the current window.
    pub fn num_samples(&self) -> usize {
        self.timestamps.len()
    }

    pub fn tracked_types(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self, type_name: &str) -> Option<&BoundedHistory<u64>> {
        self.history.get(type_name)
    }

    /// Fold one census into the histories.
    ///
    /// New types are zero-filled to the pre-tick sample count before their
    /// first real sample, tracked types missing from `counts` get a zero, and
    /// any type whose window is now entirely zero is dropped.  Call
    /// [`SampleStore::record_timestamp`] afterwards to close the tick.
    pub fn merge(&mut self, counts: &Census) -> MergeStats {
        let num_samples = self.num_samples();
        let mut stats = MergeStats::default();

        for (type_name, count) in counts.iter() {
            if !self.history.contains_key(type_name) {
                let mut history = BoundedHistory::new(self.capacity);
                history.extend(std::iter::repeat(0).take(num_samples));
                self.history.insert(type_name.to_string(), history);
                stats.added += 1;
            }
            if let Some(history) = self.history.get_mut(type_name) {
                history.append(count);
            }
        }

        let before = self.history.len();
        self.history.retain(|type_name, history| {
            if !counts.contains(type_name) {
                history.append(0);
            }
            !history.is_all_zero()
        });
        stats.pruned = before - self.history.len();

        stats
    }

    /// Close the tick by appending its timestamp (Unix milliseconds).
    pub fn record_timestamp(&mut self, now_ms: i64) {
        self.timestamps.append(now_ms);
    }

    /// Verify every tracked history is exactly as long as the timestamp history.
    pub fn check_alignment(&self) -> Result<()> {
        let expected = self.num_samples();
        match self.history.iter().find(|(_, h)| h.len() != expected) {
            Some((type_name, history)) => Err(SpyError::InvariantViolation {
                type_name: type_name.clone(),
                expected,
                actual: history.len(),
            }),
            None => Ok(()),
        }
    }

    /// Merge, timestamp and check in one step.
    pub fn apply_tick(&mut self, counts: &Census, now_ms: i64) -> Result<MergeStats> {
        let stats = self.merge(counts);
        self.record_timestamp(now_ms);
        self.check_alignment()?;
        Ok(stats)
    }

    /// Append to one history without touching the others.
    #[cfg(test)]
    pub(crate) fn append_unaligned(&mut self, type_name: &str, value: u64) {
        if let Some(history) = self.history.get_mut(type_name) {
            history.append(value);
        }
    }

    /// Deep copy of every series and the timestamps.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            capacity:   self.capacity(),
            timestamps: self.timestamps.to_vec(),
            series: self
                .history
                .iter()
                .map(|(name, history)| (name.clone(), history.to_vec()))
                .collect(),
        }
    }
}
