//! Sampling and bounded-history engine.
//!
//! A [`Sampler`] asks a census adapter for live-instance counts on every
//! tick and folds them into a [`SampleStore`]: one fixed-capacity
//! [`BoundedHistory`] per type name, kept the same length as a shared
//! history of tick timestamps.

pub mod history;
pub mod reporter;
pub mod sampler;
pub mod store;

pub use history::BoundedHistory;
pub use reporter::{Reporter, TickStats, TracingReporter};
pub use sampler::{Sampler, SamplerState, SnapshotReader, TickOutcome};
pub use store::{MergeStats, SampleStore};
