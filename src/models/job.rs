//! Job model.
//!
//! A job is a unit of CPU work: it arrives at a point in simulated time and
//! needs `burst` ticks of processing before it completes.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5

use serde::{Deserialize, Serialize};

/// Simulated time in integer ticks.
pub type Time = i64;

/// Input facts for a job: identity, arrival and processing demand.
///
/// This is the serializable form used by batch submission and by the
/// workload generator. It is checked before it becomes a [`Job`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Unique job identifier.
    pub id: String,
    /// Arrival time (ticks).
    pub arrival: Time,
    /// Total processing demand (ticks).
    pub burst: Time,
}

impl JobSpec {
    /// Creates a job spec.
    pub fn new(id: impl Into<String>, arrival: Time, burst: Time) -> Self {
        Self {
            id: id.into(),
            arrival,
            burst,
        }
    }
}

/// A job held in the ledger, with its run-state.
///
/// The input facts (`id`, `arrival`, `burst`) never change once the job is
/// accepted. The run-state is owned by the simulation: it is reset before
/// every run and only the driver's dispatch and finalize steps mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Arrival time (ticks).
    pub arrival: Time,
    /// Total processing demand (ticks).
    pub burst: Time,
    remaining: Time,
    completion: Option<Time>,
    turnaround: Time,
    waiting: Time,
}

impl Job {
    /// Creates a job in its initial run-state.
    ///
    /// Does not validate; the ledger rejects bad input before construction.
    pub(crate) fn new(id: impl Into<String>, arrival: Time, burst: Time) -> Self {
        Self {
            id: id.into(),
            arrival,
            burst,
            remaining: burst,
            completion: None,
            turnaround: 0,
            waiting: 0,
        }
    }

    /// Processing time still owed (ticks).
    #[inline]
    pub fn remaining(&self) -> Time {
        self.remaining
    }

    /// Completion time, once the job has finished.
    #[inline]
    pub fn completion(&self) -> Option<Time> {
        self.completion
    }

    /// Completion time minus arrival time. Zero until finished.
    #[inline]
    pub fn turnaround(&self) -> Time {
        self.turnaround
    }

    /// Turnaround minus burst. Zero until finished.
    #[inline]
    pub fn waiting(&self) -> Time {
        self.waiting
    }

    /// Whether all processing demand has been served.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Whether the job has arrived by time `now`.
    #[inline]
    pub fn has_arrived(&self, now: Time) -> bool {
        self.arrival <= now
    }

    /// The input facts of this job.
    pub fn spec(&self) -> JobSpec {
        JobSpec::new(self.id.clone(), self.arrival, self.burst)
    }

    /// Restores the initial run-state.
    pub(crate) fn reset(&mut self) {
        self.remaining = self.burst;
        self.completion = None;
        self.turnaround = 0;
        self.waiting = 0;
    }

    pub(crate) fn set_remaining(&mut self, remaining: Time) {
        self.remaining = remaining;
    }

    pub(crate) fn set_outcome(&mut self, completion: Time, turnaround: Time, waiting: Time) {
        self.completion = Some(completion);
        self.turnaround = turnaround;
        self.waiting = waiting;
    }
}

impl From<&Job> for JobSpec {
    fn from(job: &Job) -> Self {
        job.spec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_initial_state() {
        let job = Job::new("P1", 2, 5);
        assert_eq!(job.id, "P1");
        assert_eq!(job.arrival, 2);
        assert_eq!(job.burst, 5);
        assert_eq!(job.remaining(), 5);
        assert_eq!(job.completion(), None);
        assert!(!job.is_complete());
    }

    #[test]
    fn test_job_reset_keeps_inputs() {
        let mut job = Job::new("P1", 2, 5);
        job.set_remaining(0);
        job.set_outcome(9, 7, 2);
        assert!(job.is_complete());

        job.reset();
        assert_eq!(job.remaining(), 5);
        assert_eq!(job.completion(), None);
        assert_eq!(job.turnaround(), 0);
        assert_eq!(job.waiting(), 0);
        assert_eq!(job.spec(), JobSpec::new("P1", 2, 5));
    }

    #[test]
    fn test_has_arrived() {
        let job = Job::new("P1", 3, 1);
        assert!(!job.has_arrived(2));
        assert!(job.has_arrived(3));
        assert!(job.has_arrived(4));
    }
}
