pub mod census;
pub mod error;
pub mod snapshot;

pub use census::{Census, CensusAdapter};
pub use error::{Result, SpyError};
pub use snapshot::{display_name, Snapshot, TypeSummary};
