use crate::Result;
use std::collections::HashMap;

/// Live-instance counts keyed by type name, taken at one instant.
///
/// Types with no live instances may simply be absent; absence reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    counts: HashMap<String, u64>,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group an iterator of type names (one entry per live instance) into counts.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut census = Self::new();
        for name in names {
            census.add(name, 1);
        }
        census
    }

    /// Add `count` instances of `type_name`.
    pub fn add(&mut self, type_name: impl Into<String>, count: u64) {
        *self.counts.entry(type_name.into()).or_insert(0) += count;
    }

    /// Live count for `type_name`, zero when absent.
    pub fn get(&self, type_name: &str) -> u64 {
        self.counts.get(type_name).copied().unwrap_or(0)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.counts.contains_key(type_name)
    }

    /// Number of distinct type names.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Census {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut census = Self::new();
        for (name, count) in iter {
            census.add(name, count);
        }
        census
    }
}

/// Source of censuses.  The sampler depends only on this trait, never on
/// how counting is done.
///
/// `census` may be slow (a full table walk, a refresh of OS state); it is
/// always called off the async executor and outside the store lock.
pub trait CensusAdapter: Send + Sync {
    /// Short identifier used in log events, e.g. `"process"`.
    fn name(&self) -> &str;

    /// Count the live instances of every type present right now.
    fn census(&self) -> Result<Census>;
}
