//! Synthetic workloads.
//!
//! Generates job batches with Bernoulli arrivals: at each tick of the
//! horizon a job arrives with a fixed probability, and its burst is drawn
//! uniformly from `[min_burst, max_burst]`. Jobs are named `P1..Pn` in
//! arrival order. The same seed always yields the same batch.
//!
//! # Reference
//! Harchol-Balter (2013), "Performance Modeling and Design of Computer
//! Systems", Ch. 11: Poisson process as the limit of Bernoulli arrivals

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::{JobSpec, Time};

/// Seeded generator of job batches.
///
/// # Example
///
/// ```
/// use u_cpusched::workload::WorkloadGenerator;
///
/// let jobs = WorkloadGenerator::new(7)
///     .with_horizon(50)
///     .with_arrival_probability(0.4)
///     .with_bursts(1, 6)
///     .generate();
///
/// assert!(jobs.iter().all(|j| j.arrival < 50 && (1..=6).contains(&j.burst)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadGenerator {
    /// RNG seed.
    pub seed: u64,
    /// Arrivals happen in `[0, horizon)`.
    pub horizon: Time,
    /// Chance of an arrival per tick.
    pub arrival_probability: f64,
    /// Smallest burst.
    pub min_burst: Time,
    /// Largest burst.
    pub max_burst: Time,
    /// Stop after this many jobs.
    pub max_jobs: Option<usize>,
}

impl WorkloadGenerator {
    /// Creates a generator: horizon 100, arrival probability 0.3, bursts 1..=8.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            horizon: 100,
            arrival_probability: 0.3,
            min_burst: 1,
            max_burst: 8,
            max_jobs: None,
        }
    }

    /// Sets the arrival horizon.
    pub fn with_horizon(mut self, horizon: Time) -> Self {
        self.horizon = horizon.max(0);
        self
    }

    /// Sets the per-tick arrival probability, clamped to `[0, 1]`.
    pub fn with_arrival_probability(mut self, p: f64) -> Self {
        self.arrival_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the burst range. Bursts are at least 1.
    pub fn with_bursts(mut self, min: Time, max: Time) -> Self {
        self.min_burst = min.max(1);
        self.max_burst = max.max(self.min_burst);
        self
    }

    /// Caps the number of generated jobs.
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = Some(max_jobs);
        self
    }

    /// Generates the batch, ordered by arrival.
    pub fn generate(&self) -> Vec<JobSpec> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let min = self.min_burst.max(1);
        let max = self.max_burst.max(min);
        let limit = self.max_jobs.unwrap_or(usize::MAX);
        let mut jobs = Vec::new();

        for t in 0..self.horizon {
            if jobs.len() >= limit {
                break;
            }
            if rng.random::<f64>() < self.arrival_probability {
                let burst = rng.random_range(min..=max);
                jobs.push(JobSpec::new(format!("P{}", jobs.len() + 1), t, burst));
            }
        }

        jobs
    }
}

impl Default for WorkloadGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Policy, SchedulerConfig};
    use crate::scheduler::Simulator;
    use crate::validation::validate_jobs;

    #[test]
    fn test_same_seed_same_batch() {
        let a = WorkloadGenerator::new(42).generate();
        let b = WorkloadGenerator::new(42).generate();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_respects_bounds() {
        let jobs = WorkloadGenerator::new(3)
            .with_horizon(200)
            .with_arrival_probability(0.5)
            .with_bursts(2, 4)
            .generate();

        for (i, job) in jobs.iter().enumerate() {
            assert_eq!(job.id, format!("P{}", i + 1));
            assert!((0..200).contains(&job.arrival));
            assert!((2..=4).contains(&job.burst));
        }
        assert!(jobs.windows(2).all(|w| w[0].arrival < w[1].arrival));
    }

    #[test]
    fn test_builder_clamps() {
        let g = WorkloadGenerator::new(0)
            .with_horizon(-5)
            .with_arrival_probability(1.5)
            .with_bursts(0, -3);
        assert_eq!(g.horizon, 0);
        assert!((g.arrival_probability - 1.0).abs() < 1e-10);
        assert_eq!((g.min_burst, g.max_burst), (1, 1));
        assert!(g.generate().is_empty());
    }

    #[test]
    fn test_certain_arrivals_and_cap() {
        let jobs = WorkloadGenerator::new(9)
            .with_horizon(10)
            .with_arrival_probability(1.0)
            .with_max_jobs(4)
            .generate();
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs.iter().map(|j| j.arrival).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_generated_batch_simulates() {
        let jobs = WorkloadGenerator::new(11)
            .with_horizon(80)
            .with_arrival_probability(0.4)
            .with_bursts(1, 10)
            .generate();
        assert!(validate_jobs(&jobs).is_ok());
        let total_burst: Time = jobs.iter().map(|j| j.burst).sum();

        for policy in [Policy::Srjf, Policy::RoundRobin] {
            let mut sim = Simulator::with_config(
                SchedulerConfig::new(policy).with_processors(3).with_quantum(2),
            )
            .unwrap();
            sim.submit_batch(jobs.clone()).unwrap();
            let result = sim.run().unwrap();

            let served: Time = result.timeline.job_slots().map(|s| s.duration()).sum();
            assert_eq!(served, total_burst);
            assert!(result.metrics.per_job.iter().all(|m| m.waiting >= 0));
        }
    }
}
