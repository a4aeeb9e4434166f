use thiserror::Error;

/// Top-level error type used across the entire workspace.
#[derive(Debug, Error)]
pub enum SpyError {
    #[error("config error: {0}")]
    Config(String),

    #[error("census error: {0}")]
    Census(String),

    /// A tracked history fell out of step with the timestamp history.
    /// Only a defect in the merge logic can produce this.
    #[error(
        "history for '{type_name}' holds {actual} samples but {expected} timestamps are recorded"
    )]
    InvariantViolation {
        type_name: String,
        expected:  usize,
        actual:    usize,
    },

    #[error("sampler error: {0}")]
    Lifecycle(String),
}

impl SpyError {
    /// `true` for errors that must never be absorbed by the tick loop.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}

pub type Result<T, E = SpyError> = std::result::Result<T, E>;
