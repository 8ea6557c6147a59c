//! Job ledger: the arena that owns every job of a simulation.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{InvariantViolation, SimError, SimResult};
use crate::models::{Job, JobSpec, Time};
use crate::validation::{self, ValidationError, ValidationErrorKind};

/// Index of a job in its ledger.
pub type JobIdx = usize;

/// Owned collection of jobs, addressed by [`JobIdx`].
///
/// Submission order is ledger order, which is also the SRJF tie-break.
/// Indices are stable for the duration of a run; removing a job shifts
/// later indices, so removal only happens between runs.
#[derive(Debug, Clone, Default)]
pub struct JobLedger {
    jobs: Vec<Job>,
}

impl JobLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from a batch of specs, rejecting it as a whole if any
    /// spec is invalid.
    pub fn from_specs(specs: impl IntoIterator<Item = JobSpec>) -> SimResult<Self> {
        let mut ledger = Self::new();
        ledger.submit_batch(specs)?;
        Ok(ledger)
    }

    /// Adds a job.
    ///
    /// Fails with [`SimError::InvalidJob`] for an empty id, negative arrival,
    /// non-positive burst, an id already in the ledger, or a job that would
    /// push the ledger past the representable time range. A rejected job
    /// never enters the ledger.
    pub fn submit(
        &mut self,
        id: impl Into<String>,
        arrival: Time,
        burst: Time,
    ) -> SimResult<JobIdx> {
        let id = id.into();
        validation::validate_job(&id, arrival, burst).map_err(reject)?;
        if self.find(&id).is_some() {
            return Err(reject(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {id}"),
            )));
        }
        self.check_time_horizon(std::iter::once((arrival, burst)))
            .map_err(reject)?;

        debug!(job = %id, arrival, burst, "job submitted");
        self.jobs.push(Job::new(id, arrival, burst));
        Ok(self.jobs.len() - 1)
    }

    /// Adds several jobs; either all are accepted or none.
    ///
    /// Returns the number of jobs added.
    pub fn submit_batch(&mut self, specs: impl IntoIterator<Item = JobSpec>) -> SimResult<usize> {
        let specs: Vec<JobSpec> = specs.into_iter().collect();
        if let Err(errors) = validation::validate_jobs(&specs) {
            for e in &errors {
                warn!(error = %e, "job batch rejected");
            }
            if let Some(first) = errors.into_iter().next() {
                return Err(SimError::InvalidJob(first));
            }
        }

        let existing: HashSet<&str> = self.jobs.iter().map(|j| j.id.as_str()).collect();
        if let Some(dup) = specs.iter().find(|s| existing.contains(s.id.as_str())) {
            return Err(reject(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", dup.id),
            )));
        }
        self.check_time_horizon(specs.iter().map(|s| (s.arrival, s.burst)))
            .map_err(reject)?;

        let count = specs.len();
        self.jobs
            .extend(specs.into_iter().map(|s| Job::new(s.id, s.arrival, s.burst)));
        Ok(count)
    }

    /// Removes a job by id.
    pub fn remove(&mut self, id: &str) -> Option<Job> {
        let idx = self.find(id)?;
        Some(self.jobs.remove(idx))
    }

    /// Restores every job's initial run-state. Inputs are untouched.
    pub fn reset(&mut self) {
        for job in &mut self.jobs {
            job.reset();
        }
    }

    /// Number of jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the ledger holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// All jobs, in ledger order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Iterates over `(index, job)` in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = (JobIdx, &Job)> {
        self.jobs.iter().enumerate()
    }

    /// Job at `idx`.
    ///
    /// # Panics
    /// If `idx` did not come from this ledger.
    #[inline]
    pub fn job(&self, idx: JobIdx) -> &Job {
        &self.jobs[idx]
    }

    /// Index of the job with the given id.
    pub fn find(&self, id: &str) -> Option<JobIdx> {
        self.jobs.iter().position(|j| j.id == id)
    }

    /// Job with the given id.
    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Whether the job at `idx` has no remaining work.
    #[inline]
    pub fn is_complete(&self, idx: JobIdx) -> bool {
        self.jobs[idx].is_complete()
    }

    /// Number of finished jobs.
    pub fn completed_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_complete()).count()
    }

    /// Whether every job has finished.
    pub fn all_complete(&self) -> bool {
        self.jobs.iter().all(Job::is_complete)
    }

    /// Work still owed across all jobs.
    pub fn total_remaining(&self) -> Time {
        self.jobs.iter().map(Job::remaining).sum()
    }

    /// Checks the ledger's jobs plus `incoming` against the time range.
    fn check_time_horizon(
        &self,
        incoming: impl Iterator<Item = (Time, Time)>,
    ) -> Result<(), ValidationError> {
        let current = self.jobs.iter().map(|j| (j.arrival, j.burst));
        validation::validate_time_horizon(current.chain(incoming))
    }

    /// Charges `slice` ticks of service to a job.
    pub(crate) fn consume(&mut self, idx: JobIdx, slice: Time) -> Result<(), InvariantViolation> {
        let job = &mut self.jobs[idx];
        if slice <= 0 || slice > job.remaining() {
            return Err(InvariantViolation::SliceOverrun {
                job: job.id.clone(),
                slice,
                remaining: job.remaining(),
            });
        }
        let remaining = job.remaining() - slice;
        job.set_remaining(remaining);
        Ok(())
    }

    /// Records the outcome of a job whose last slice ends at `end`.
    pub(crate) fn finalize(&mut self, idx: JobIdx, end: Time) -> Result<(), InvariantViolation> {
        let job = &mut self.jobs[idx];
        let turnaround = end - job.arrival;
        let waiting = turnaround - job.burst;
        if waiting < 0 {
            return Err(InvariantViolation::NegativeWaiting {
                job: job.id.clone(),
                waiting,
            });
        }
        job.set_outcome(end, turnaround, waiting);
        Ok(())
    }
}

fn reject(error: ValidationError) -> SimError {
    warn!(error = %error, "job rejected");
    SimError::InvalidJob(error)
}
