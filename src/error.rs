//! Error types.
//!
//! User errors (bad jobs, bad configuration, empty job set) are reported and
//! leave state untouched. [`InvariantViolation`] is a defect class: it means
//! the engine itself is wrong and is never an expected outcome.

use thiserror::Error;

use crate::models::Time;
use crate::validation::ValidationError;

/// Simulation operation result.
pub type SimResult<T> = Result<T, SimError>;

/// Simulation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Invalid job: {0}")]
    InvalidJob(ValidationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot run a simulation without jobs")]
    EmptyJobSet,

    #[error("Scheduler invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl SimError {
    /// Whether this error reports an engine defect rather than bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, SimError::Invariant(_))
    }
}

/// Internal scheduler defects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("job '{job}' offered to processor {processor} while running on processor {running_on}")]
    DoubleAssignment {
        job: String,
        processor: usize,
        running_on: usize,
    },

    #[error("processor {processor} assigned at {now} but busy until {free_at}")]
    ProcessorBusy {
        processor: usize,
        free_at: Time,
        now: Time,
    },

    #[error("job '{job}' given a slice of {slice} with {remaining} remaining")]
    SliceOverrun {
        job: String,
        slice: Time,
        remaining: Time,
    },

    #[error("job '{job}' finished with negative waiting time {waiting}")]
    NegativeWaiting { job: String, waiting: Time },

    #[error("timeline audit failed: {0}")]
    TimelineAudit(ValidationError),
}
