//! Input validation and timeline auditing.
//!
//! Job checks run at submission, before anything enters the ledger:
//! - Empty IDs
//! - Negative arrival times
//! - Non-positive bursts
//! - Duplicate IDs
//! - Job sets whose latest possible finish does not fit in [`Time`]
//!
//! The timeline audit runs after every simulation and checks the
//! conservation properties a correct schedule must satisfy:
//! - No overlapping slots on one processor
//! - No overlapping slots of one job across processors
//! - Served time equals burst for every job
//! - Recorded metrics agree with the timeline

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::{Job, JobSpec, Time, Timeline, TimelineSlot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A job has an empty ID. Whitespace is a valid ID.
    EmptyId,
    /// A job arrives before t=0.
    NegativeArrival,
    /// A job has no processing demand.
    NonPositiveBurst,
    /// Two jobs share the same ID.
    DuplicateId,
    /// The latest arrival plus the total burst overflows [`Time`].
    TimeOverflow,
    /// A slot is empty, reversed, or on processor 0.
    MalformedSlot,
    /// A slot names a job that is not in the job set.
    UnknownJob,
    /// A slot starts before its job arrived.
    EarlyStart,
    /// Two slots overlap on the same processor.
    ProcessorOverlap,
    /// Two slots of the same job overlap in time.
    JobOverlap,
    /// A job's served time differs from its burst.
    WorkMismatch,
    /// Completion, turnaround or waiting disagree with the timeline.
    MetricMismatch,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks a single job's input facts.
///
/// Returns the first problem found. Duplicate IDs are checked by the
/// ledger (or by [`validate_jobs`] for a whole batch).
pub fn validate_job(id: &str, arrival: Time, burst: Time) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::EmptyId,
            "Job ID must not be empty",
        ));
    }
    if arrival < 0 {
        return Err(ValidationError::new(
            ValidationErrorKind::NegativeArrival,
            format!("Job '{id}' has negative arrival time {arrival}"),
        ));
    }
    if burst <= 0 {
        return Err(ValidationError::new(
            ValidationErrorKind::NonPositiveBurst,
            format!("Job '{id}' has non-positive burst {burst}"),
        ));
    }
    Ok(())
}

/// Validates a batch of job specs.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_jobs(jobs: &[JobSpec]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for job in jobs {
        if let Err(e) = validate_job(&job.id, job.arrival, job.burst) {
            errors.push(e);
        }
        if !ids.insert(job.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", job.id),
            ));
        }
    }

    if let Err(e) = validate_time_horizon(jobs.iter().map(|j| (j.arrival, j.burst))) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that a job set can be simulated without overflowing [`Time`].
///
/// No slot can end after the latest arrival plus the sum of all bursts,
/// so that bound must be representable.
///
/// # Arguments
/// * `jobs` - `(arrival, burst)` of every job in the set.
pub fn validate_time_horizon(
    jobs: impl IntoIterator<Item = (Time, Time)>,
) -> Result<(), ValidationError> {
    let mut latest_arrival: Time = 0;
    let mut total_burst: Time = 0;
    let mut overflowed = false;

    for (arrival, burst) in jobs {
        latest_arrival = latest_arrival.max(arrival);
        match total_burst.checked_add(burst) {
            Some(total) => total_burst = total,
            None => overflowed = true,
        }
    }

    if overflowed || latest_arrival.checked_add(total_burst).is_none() {
        return Err(ValidationError::new(
            ValidationErrorKind::TimeOverflow,
            format!("Latest arrival {latest_arrival} plus total burst overflows the time range"),
        ));
    }
    Ok(())
}

/// Audits a finished timeline against the jobs it was produced from.
///
/// Every job is expected to be complete.
pub fn audit_timeline(timeline: &Timeline, jobs: &[Job]) -> ValidationResult {
    let mut errors = Vec::new();
    let by_id: HashMap<&str, &Job> = jobs.iter().map(|j| (j.id.as_str(), j)).collect();

    let mut per_processor: HashMap<usize, Vec<&TimelineSlot>> = HashMap::new();
    let mut per_job: HashMap<&str, Vec<&TimelineSlot>> = HashMap::new();

    for slot in &timeline.slots {
        if slot.start >= slot.end || slot.processor == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::MalformedSlot,
                format!(
                    "Malformed slot [{}, {}) on processor {}",
                    slot.start, slot.end, slot.processor
                ),
            ));
            continue;
        }
        per_processor.entry(slot.processor).or_default().push(slot);

        if let Some(job_id) = slot.job_id() {
            match by_id.get(job_id) {
                Some(job) if slot.start < job.arrival => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::EarlyStart,
                        format!(
                            "Job '{job_id}' runs at {} before arriving at {}",
                            slot.start, job.arrival
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownJob,
                        format!("Slot references unknown job '{job_id}'"),
                    ));
                }
            }
            per_job.entry(job_id).or_default().push(slot);
        }
    }

    for (processor, slots) in &mut per_processor {
        slots.sort_by_key(|s| s.start);
        for pair in slots.windows(2) {
            if pair[0].overlaps(pair[1]) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ProcessorOverlap,
                    format!(
                        "Processor {processor}: [{}, {}) overlaps [{}, {})",
                        pair[0].start, pair[0].end, pair[1].start, pair[1].end
                    ),
                ));
            }
        }
    }

    for (job_id, slots) in &mut per_job {
        slots.sort_by_key(|s| s.start);
        for pair in slots.windows(2) {
            if pair[0].overlaps(pair[1]) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::JobOverlap,
                    format!(
                        "Job '{job_id}' runs on processors {} and {} at once",
                        pair[0].processor, pair[1].processor
                    ),
                ));
            }
        }
    }

    for job in jobs {
        let slots = per_job.get(job.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        let served: Time = slots.iter().map(|s| s.duration()).sum();
        if served != job.burst {
            errors.push(ValidationError::new(
                ValidationErrorKind::WorkMismatch,
                format!("Job '{}' served {served} of burst {}", job.id, job.burst),
            ));
            continue;
        }

        let last_end = slots.iter().map(|s| s.end).max();
        let consistent = job.completion() == last_end
            && job.turnaround() == job.completion().unwrap_or(0) - job.arrival
            && job.waiting() == job.turnaround() - job.burst;
        if !consistent {
            errors.push(ValidationError::new(
                ValidationErrorKind::MetricMismatch,
                format!(
                    "Job '{}' metrics disagree with timeline (completion {:?}, last slot end {:?})",
                    job.id,
                    job.completion(),
                    last_end
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
