//! Run metrics.
//!
//! Computes per-job and aggregate performance indicators from a finished
//! timeline and the jobs it was produced from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Turnaround | completion - arrival |
//! | Waiting | turnaround - burst |
//! | Response | first start - arrival |
//! | Makespan | Latest completion time |
//! | Utilization | Busy time / makespan, per processor |
//! | Preemptions | Slices that ended with work remaining |
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.2: Scheduling Criteria

use serde::{Deserialize, Serialize};

use crate::models::{Job, Time, Timeline};

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetrics {
    /// Job ID.
    pub id: String,
    /// Arrival time.
    pub arrival: Time,
    /// Processing demand.
    pub burst: Time,
    /// Completion time.
    pub completion: Time,
    /// completion - arrival.
    pub turnaround: Time,
    /// turnaround - burst.
    pub waiting: Time,
    /// First start - arrival.
    pub response: Time,
    /// Number of slices the job ran in.
    pub slices: usize,
}

/// Sums over all jobs, saturating at [`Time::MAX`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTotals {
    pub waiting: Time,
    pub turnaround: Time,
}

/// Means over all jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricAverages {
    pub waiting: f64,
    pub turnaround: f64,
    pub response: f64,
}

/// Performance indicators of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Per-job outcomes, in ledger order.
    pub per_job: Vec<JobMetrics>,
    /// Total waiting and turnaround.
    pub totals: MetricTotals,
    /// Average waiting, turnaround and response.
    pub averages: MetricAverages,
    /// Longest waiting time of any job.
    pub max_waiting: Time,
    /// Latest completion time.
    pub makespan: Time,
    /// Slices that ended with the job unfinished.
    pub preemptions: usize,
    /// Utilization of processors 1..=n over the makespan.
    pub utilization_by_processor: Vec<f64>,
    /// Mean of `utilization_by_processor`.
    pub avg_utilization: f64,
}

impl RunMetrics {
    /// Computes metrics from a finished run.
    ///
    /// # Arguments
    /// * `timeline` - The run's timeline.
    /// * `jobs` - The ledger's jobs after the run (all finished).
    /// * `processor_count` - Processors in the run, used and unused.
    pub fn calculate(timeline: &Timeline, jobs: &[Job], processor_count: usize) -> Self {
        let mut per_job = Vec::with_capacity(jobs.len());
        let mut totals = MetricTotals::default();
        let mut sum_waiting = 0.0;
        let mut sum_turnaround = 0.0;
        let mut sum_response = 0.0;
        let mut max_waiting: Time = 0;
        let mut preemptions = 0;

        for job in jobs {
            let slices = timeline.slots_for_job(&job.id).len();
            let first_start = timeline.first_start(&job.id).unwrap_or(job.arrival);
            let response = first_start - job.arrival;

            totals.waiting = totals.waiting.saturating_add(job.waiting());
            totals.turnaround = totals.turnaround.saturating_add(job.turnaround());
            sum_waiting += job.waiting() as f64;
            sum_turnaround += job.turnaround() as f64;
            sum_response += response as f64;
            max_waiting = max_waiting.max(job.waiting());
            preemptions += slices.saturating_sub(1);

            per_job.push(JobMetrics {
                id: job.id.clone(),
                arrival: job.arrival,
                burst: job.burst,
                completion: job.completion().unwrap_or(0),
                turnaround: job.turnaround(),
                waiting: job.waiting(),
                response,
                slices,
            });
        }

        let averages = if jobs.is_empty() {
            MetricAverages::default()
        } else {
            let n = jobs.len() as f64;
            MetricAverages {
                waiting: sum_waiting / n,
                turnaround: sum_turnaround / n,
                response: sum_response / n,
            }
        };

        let utilization_by_processor = timeline.utilizations(processor_count);
        let avg_utilization = if utilization_by_processor.is_empty() {
            0.0
        } else {
            utilization_by_processor.iter().sum::<f64>() / utilization_by_processor.len() as f64
        };

        Self {
            per_job,
            totals,
            averages,
            max_waiting,
            makespan: timeline.makespan(),
            preemptions,
            utilization_by_processor,
            avg_utilization,
        }
    }

    /// Metrics of one job.
    pub fn job(&self, id: &str) -> Option<&JobMetrics> {
        self.per_job.iter().find(|m| m.id == id)
    }

    /// Completed jobs per tick over the makespan.
    pub fn throughput(&self) -> f64 {
        if self.makespan <= 0 {
            0.0
        } else {
            self.per_job.len() as f64 / self.makespan as f64
        }
    }
}
