//! Census adapters.
//!
//! - [`ProcessCensus`]: live OS processes grouped by executable name.
//! - [`InstanceRegistry`]: values wrapped in [`Tracked`], grouped by Rust type.

pub mod process;
pub mod registry;

pub use process::ProcessCensus;
pub use registry::{InstanceRegistry, Tracked};
