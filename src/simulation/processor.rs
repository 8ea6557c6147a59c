//! Processor bank.

use crate::error::InvariantViolation;
use crate::models::{Job, Time, TimelineSlot};

use super::JobIdx;

/// One processor's bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Processor {
    /// Time at which the current slice ends. The processor may take a new
    /// job at any `t >= free_at`.
    pub free_at: Time,
    /// Job holding the processor until `free_at`.
    pub occupant: Option<JobIdx>,
}

/// Ordered processors, indexed from 0 internally and from 1 in slots.
///
/// Occupancy is tracked here and nowhere else, so "is this job running"
/// and "which processor is busy" cannot disagree.
#[derive(Debug, Clone)]
pub struct ProcessorBank {
    processors: Vec<Processor>,
}

impl ProcessorBank {
    /// Creates `count` processors, all free at t=0.
    pub fn new(count: usize) -> Self {
        Self {
            processors: vec![Processor::default(); count],
        }
    }

    /// Number of processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether the bank has no processors.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Processor at 0-based `index`.
    pub fn processor(&self, index: usize) -> &Processor {
        &self.processors[index]
    }

    /// Whether the processor can take a job at `now`.
    #[inline]
    pub fn is_free(&self, index: usize, now: Time) -> bool {
        self.processors[index].free_at <= now
    }

    /// Indices of processors free at `now`, ascending.
    pub fn free_processors(&self, now: Time) -> Vec<usize> {
        (0..self.processors.len())
            .filter(|&i| self.is_free(i, now))
            .collect()
    }

    /// Processor currently holding `job`.
    pub fn running_on(&self, job: JobIdx) -> Option<usize> {
        self.processors
            .iter()
            .position(|p| p.occupant == Some(job))
    }

    /// Whether `job` holds any processor.
    #[inline]
    pub fn is_running(&self, job: JobIdx) -> bool {
        self.running_on(job).is_some()
    }

    /// Clears the occupant of a processor whose slice has ended by `now`.
    ///
    /// Returns the released job, if any.
    pub fn release(&mut self, index: usize, now: Time) -> Option<JobIdx> {
        let processor = &mut self.processors[index];
        if processor.free_at <= now {
            processor.occupant.take()
        } else {
            None
        }
    }

    /// Starts a slice of `slice` ticks of `job` on processor `index` at `now`.
    ///
    /// Returns the slot for the timeline. Fails if the processor is still
    /// busy or the job already holds another processor.
    pub fn assign(
        &mut self,
        index: usize,
        job_idx: JobIdx,
        job: &Job,
        slice: Time,
        now: Time,
    ) -> Result<TimelineSlot, InvariantViolation> {
        if let Some(running_on) = self.running_on(job_idx) {
            return Err(InvariantViolation::DoubleAssignment {
                job: job.id.clone(),
                processor: index + 1,
                running_on: running_on + 1,
            });
        }

        let processor = &mut self.processors[index];
        if processor.free_at > now || processor.occupant.is_some() {
            return Err(InvariantViolation::ProcessorBusy {
                processor: index + 1,
                free_at: processor.free_at,
                now,
            });
        }

        processor.free_at = now + slice;
        processor.occupant = Some(job_idx);
        Ok(TimelineSlot::job(job.id.clone(), index + 1, now, now + slice))
    }

    /// Earliest `free_at` strictly after `now`.
    pub fn next_free_after(&self, now: Time) -> Option<Time> {
        self.processors
            .iter()
            .map(|p| p.free_at)
            .filter(|&t| t > now)
            .min()
    }
}
