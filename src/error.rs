// Errors — Everything that can go wrong when building a schedule
//
// The schedule itself is a pure function of the step index, so the only
// caller-visible failures happen at construction time. Once a OneCycleLR
// exists, every advance()/current_rate() call succeeds and yields a finite
// rate.

use thiserror::Error;

/// Errors raised while configuring a learning rate schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// A configuration invariant was violated.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// A warmup shape name that is neither linear nor exponential.
    #[error("unknown warmup shape `{0}` (expected `linear`, `exp` or `exponential`)")]
    UnknownWarmupShape(String),
}

impl ScheduleError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
