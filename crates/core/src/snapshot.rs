use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Crate prefixes hidden by [`display_name`].
const STD_PREFIXES: [&str; 3] = ["alloc::", "core::", "std::"];

/// A point-in-time copy of the whole sample store.
///
/// Every series has exactly `timestamps.len()` samples, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// History window size the samples were recorded with.
    pub capacity: usize,
    /// Tick times as Unix milliseconds, oldest first.
    pub timestamps: Vec<i64>,
    /// Per-type samples, aligned with `timestamps`.
    pub series: BTreeMap<String, Vec<u64>>,
}

impl Snapshot {
    /// Number of ticks currently held in the window.
    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.timestamps.len()
    }

    pub fn samples(&self, type_name: &str) -> Option<&[u64]> {
        self.series.get(type_name).map(Vec::as_slice)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Time of the most recent tick, if any.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps
            .last()
            .and_then(|&ms| DateTime::from_timestamp_millis(ms))
    }

    /// Samples right-padded with `None` up to `capacity`, so a fixed-width
    /// chart fills from the left while the window is still warming up.
    pub fn padded(&self, type_name: &str) -> Option<Vec<Option<u64>>> {
        let samples = self.series.get(type_name)?;
        let mut data: Vec<Option<u64>> = samples.iter().copied().map(Some).collect();
        data.resize(self.capacity.max(samples.len()), None);
        Some(data)
    }

    /// One summary per tracked type, sorted by display name.
    pub fn summaries(&self) -> Vec<TypeSummary> {
        let mut out: Vec<TypeSummary> = self
            .series
            .iter()
            .filter_map(|(name, samples)| TypeSummary::from_samples(name, samples))
            .collect();
        out.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.type_name.cmp(&b.type_name))
        });
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Min / max / current for one tracked type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub type_name:    String,
    pub display_name: String,
    pub min:          u64,
    pub max:          u64,
    pub current:      u64,
}

impl TypeSummary {
    /// `None` for an empty series.
    pub fn from_samples(type_name: &str, samples: &[u64]) -> Option<Self> {
        let current = *samples.last()?;
        Some(Self {
            type_name:    type_name.to_string(),
            display_name: display_name(type_name).to_string(),
            min:          samples.iter().copied().min().unwrap_or(current),
            max:          samples.iter().copied().max().unwrap_or(current),
            current,
        })
    }

    /// Y-axis upper bound for a chart of this series: `max` rounded up to
    /// the next multiple of ten, strictly above `max`.
    #[must_use]
    pub fn chart_ceiling(&self) -> u64 {
        (self.max / 10).saturating_add(1).saturating_mul(10)
    }
}

/// Make a type name slightly more human-readable by dropping standard
/// library crate prefixes (`alloc::string::String` → `string::String`).
pub fn display_name(type_name: &str) -> &str {
    STD_PREFIXES
        .iter()
        .find_map(|prefix| type_name.strip_prefix(prefix))
        .unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let mut series = BTreeMap::new();
        series.insert("alloc::string::String".to_string(), vec![4, 9, 2]);
        series.insert("app::Widget".to_string(), vec![0, 0, 7]);
        Snapshot {
            capacity: 5,
            timestamps: vec![1_000, 2_000, 3_000],
            series,
        }
    }

    #[test]
    fn display_name_strips_std_prefixes() {
        assert_eq!(display_name("alloc::string::String"), "string::String");
        assert_eq!(display_name("std::sync::Arc<u8>"), "sync::Arc<u8>");
        assert_eq!(display_name("app::Widget"), "app::Widget");
    }

    #[test]
    fn summaries_report_min_max_current_sorted_by_display_name() {
        let summaries = snapshot().summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].display_name, "app::Widget");
        assert_eq!(summaries[1].display_name, "string::String");
        assert_eq!(
            (summaries[1].min, summaries[1].max, summaries[1].current),
            (2, 9, 2)
        );
    }

    #[test]
    fn chart_ceiling_rounds_up_past_max() {
        let s = TypeSummary::from_samples("x", &[3, 10]).unwrap();
        assert_eq!(s.chart_ceiling(), 20);
        let s = TypeSummary::from_samples("x", &[0]).unwrap();
        assert_eq!(s.chart_ceiling(), 10);
    }

    #[test]
    fn chart_ceiling_saturates_near_the_top_of_the_range() {
        let s = TypeSummary::from_samples("x", &[u64::MAX]).unwrap();
        assert_eq!(s.chart_ceiling(), u64::MAX);
        let s = TypeSummary::from_samples("x", &[u64::MAX - 5]).unwrap();
        assert!(s.chart_ceiling() >= s.max);
    }

    #[test]
    fn empty_series_has_no_summary() {
        assert!(TypeSummary::from_samples("x", &[]).is_none());
    }

    #[test]
    fn padded_fills_to_capacity() {
        let padded = snapshot().padded("app::Widget").unwrap();
        assert_eq!(padded, vec![Some(0), Some(0), Some(7), None, None]);
        assert!(snapshot().padded("missing").is_none());
    }

    #[test]
    fn latest_timestamp_converts_millis() {
        let ts = snapshot().latest_timestamp().unwrap();
        assert_eq!(ts.timestamp_millis(), 3_000);
        assert!(Snapshot::default().latest_timestamp().is_none());
    }

    #[test]
    fn json_carries_series_and_timestamps() {
        let json = snapshot().to_json().unwrap();
        assert!(json.contains("\"timestamps\":[1000,2000,3000]"));
        assert!(json.contains("\"app::Widget\":[0,0,7]"));
    }
}
