//! Timeline (Gantt) model.
//!
//! A timeline is the ordered record of every uninterrupted execution
//! interval produced by a simulation run.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.3

use serde::{Deserialize, Serialize};

use super::Time;

/// What occupied a processor during a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupant {
    /// A job, by id.
    Job(String),
    /// No job; only emitted in idle-slot mode.
    Idle,
}

/// One contiguous, non-preempted execution interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSlot {
    /// Job (or idle marker) that held the processor.
    pub occupant: Occupant,
    /// Processor index, 1-based.
    pub processor: usize,
    /// Start time (ticks).
    pub start: Time,
    /// End time (ticks), exclusive.
    pub end: Time,
}

impl TimelineSlot {
    /// Creates a job slot.
    pub fn job(job_id: impl Into<String>, processor: usize, start: Time, end: Time) -> Self {
        Self {
            occupant: Occupant::Job(job_id.into()),
            processor,
            start,
            end,
        }
    }

    /// Creates an idle slot.
    pub fn idle(processor: usize, start: Time, end: Time) -> Self {
        Self {
            occupant: Occupant::Idle,
            processor,
            start,
            end,
        }
    }

    /// Job id, or `None` for an idle slot.
    pub fn job_id(&self) -> Option<&str> {
        match &self.occupant {
            Occupant::Job(id) => Some(id),
            Occupant::Idle => None,
        }
    }

    /// Whether this is an idle slot.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.occupant == Occupant::Idle
    }

    /// Slot length (end - start).
    #[inline]
    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    /// Whether two half-open intervals share any instant.
    #[inline]
    pub fn overlaps(&self, other: &TimelineSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The full execution record of a run, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Slots in the order they were dispatched.
    pub slots: Vec<TimelineSlot>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a slot.
    pub fn push(&mut self, slot: TimelineSlot) {
        self.slots.push(slot);
    }

    /// Number of slots, idle slots included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the timeline has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over job slots, skipping idle ones.
    pub fn job_slots(&self) -> impl Iterator<Item = &TimelineSlot> {
        self.slots.iter().filter(|s| !s.is_idle())
    }

    /// Slots of one processor (1-based), ordered by start time.
    pub fn slots_for_processor(&self, processor: usize) -> Vec<&TimelineSlot> {
        let mut slots: Vec<&TimelineSlot> = self
            .slots
            .iter()
            .filter(|s| s.processor == processor)
            .collect();
        slots.sort_by_key(|s| s.start);
        slots
    }

    /// Slots of one job, ordered by start time.
    pub fn slots_for_job(&self, job_id: &str) -> Vec<&TimelineSlot> {
        let mut slots: Vec<&TimelineSlot> = self
            .slots
            .iter()
            .filter(|s| s.job_id() == Some(job_id))
            .collect();
        slots.sort_by_key(|s| s.start);
        slots
    }

    /// Processors (1-based) that appear in the timeline, ascending.
    pub fn processors_used(&self) -> Vec<usize> {
        let mut used: Vec<usize> = self.slots.iter().map(|s| s.processor).collect();
        used.sort_unstable();
        used.dedup();
        used
    }

    /// Latest end time of any job slot.
    pub fn makespan(&self) -> Time {
        self.job_slots().map(|s| s.end).max().unwrap_or(0)
    }

    /// Time a processor spent running jobs.
    pub fn busy_time(&self, processor: usize) -> Time {
        self.job_slots()
            .filter(|s| s.processor == processor)
            .map(TimelineSlot::duration)
            .sum()
    }

    /// Busy time over `horizon`. `None` if the horizon is not positive.
    pub fn utilization(&self, processor: usize, horizon: Time) -> Option<f64> {
        if horizon <= 0 {
            return None;
        }
        Some(self.busy_time(processor) as f64 / horizon as f64)
    }

    /// Utilization of processors `1..=processor_count` over the makespan.
    ///
    /// Empty when nothing ran.
    pub fn utilizations(&self, processor_count: usize) -> Vec<f64> {
        let horizon = self.makespan();
        (1..=processor_count)
            .filter_map(|p| self.utilization(p, horizon))
            .collect()
    }

    /// First start time of a job.
    pub fn first_start(&self, job_id: &str) -> Option<Time> {
        self.slots_for_job(job_id).first().map(|s| s.start)
    }

    /// Completion time of a job (latest end of its slots).
    pub fn job_completion_time(&self, job_id: &str) -> Option<Time> {
        self.slots_for_job(job_id).iter().map(|s| s.end).max()
    }

    /// Total time served to a job.
    pub fn served_time(&self, job_id: &str) -> Time {
        self.slots_for_job(job_id)
            .iter()
            .map(|s| s.duration())
            .sum()
    }
}
