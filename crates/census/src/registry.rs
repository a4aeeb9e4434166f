use spy_core::{Census, CensusAdapter, Result};
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type Counters = HashMap<&'static str, Arc<AtomicU64>>;

/// Live-instance counts for values wrapped in [`Tracked`].
///
/// Each type gets one atomic counter, keyed by `std::any::type_name`.
/// Creating and dropping tracked values only touches that counter; the map
/// itself is written once per new type.
///
/// Clones share the same counters.
#[derive(Clone, Default)]
pub struct InstanceRegistry {
    counters: Arc<RwLock<Counters>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `value`, counting it as live until the guard is dropped.
    pub fn track<T>(&self, value: T) -> Tracked<T> {
        let counter = self.counter(type_name::<T>());
        counter.fetch_add(1, Ordering::Relaxed);
        Tracked { value, counter }
    }

    /// Current live count of `T`.
    pub fn live<T>(&self) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name::<T>())
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    fn counter(&self, name: &'static str) -> Arc<AtomicU64> {
        if let Some(counter) = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(counter);
        }
        let mut counters = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(counters.entry(name).or_default())
    }
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("InstanceRegistry").field("types", &types).finish()
    }
}

impl CensusAdapter for InstanceRegistry {
    fn name(&self) -> &str {
        "registry"
    }

    fn census(&self) -> Result<Census> {
        let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        let census = counters
            .iter()
            .map(|(name, counter)| (*name, counter.load(Ordering::Relaxed)))
            .filter(|&(_, count)| count > 0)
            .collect();
        Ok(census)
    }
}

/// A value counted as one live instance of `T` in an [`InstanceRegistry`].
pub struct Tracked<T> {
    value:   T,
    counter: Arc<AtomicU64>,
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Clone> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        self.counter.fetch_add(1, Ordering::Relaxed);
        Self {
            value:   self.value.clone(),
            counter: Arc::clone(&self.counter),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}
