use spy_core::{Result, SpyError};
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Rolling window of samples with a fixed capacity.
///
/// Appending to a full window evicts the oldest sample, so the window
/// always holds the most recent `capacity` values in append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedHistory<T> {
    samples:  VecDeque<T>,
    capacity: NonZeroUsize,
}

impl<T: Copy> BoundedHistory<T> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Like [`BoundedHistory::new`], for capacities coming from configuration.
    pub fn try_new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or_else(|| SpyError::Config("history capacity must be > 0".into()))
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn append(&mut self, value: T) {
        if self.samples.len() == self.capacity.get() {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Append every value in order; only the last `capacity` survive.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.append(value);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.samples.iter().copied()
    }

    pub fn last(&self) -> Option<T> {
        self.samples.back().copied()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: Copy + Ord> BoundedHistory<T> {
    pub fn min(&self) -> Option<T> {
        self.iter().min()
    }

    pub fn max(&self) -> Option<T> {
        self.iter().max()
    }
}

impl<T: Copy + Default + PartialEq> BoundedHistory<T> {
    /// `true` when every sample equals `T::default()` (an empty window counts).
    pub fn is_all_zero(&self) -> bool {
        let zero = T::default();
        self.samples.iter().all(|s| *s == zero)
    }
}
