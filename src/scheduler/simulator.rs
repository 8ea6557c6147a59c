//! Simulator facade.
//!
//! Owns a job ledger, a driver and the last published result. Jobs are
//! submitted and configured between runs; a run either publishes a complete
//! result or nothing at all.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::RunMetrics;
use crate::error::{SimError, SimResult};
use crate::models::{Job, JobSpec, Policy, SchedulerConfig, Time, Timeline, TimelineSlot};
use crate::simulation::{DriverState, JobLedger, SimulationDriver};

/// Output of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Configuration the run used.
    pub config: SchedulerConfig,
    /// Every dispatched slice.
    pub timeline: Timeline,
    /// Per-job and aggregate metrics.
    pub metrics: RunMetrics,
}

impl SimulationResult {
    /// Slots of one processor (1-based), in time order.
    pub fn slots_for_processor(&self, processor: usize) -> Vec<&TimelineSlot> {
        self.timeline.slots_for_processor(processor)
    }
}

/// Input container for a one-shot simulation.
///
/// # Example
///
/// ```
/// use u_cpusched::scheduler::SimulationRequest;
///
/// let json = r#"{
///     "jobs": [
///         {"id": "P1", "arrival": 0, "burst": 5},
///         {"id": "P2", "arrival": 1, "burst": 3}
///     ],
///     "config": {"processor_count": 1, "quantum": 3, "policy": "round_robin"}
/// }"#;
/// let request: SimulationRequest = serde_json::from_str(json).unwrap();
/// let result = request.run().unwrap();
/// assert_eq!(result.metrics.totals.waiting, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Jobs to simulate, in submission order.
    pub jobs: Vec<JobSpec>,
    /// Scheduler configuration.
    #[serde(default)]
    pub config: SchedulerConfig,
}

impl SimulationRequest {
    /// Creates a request.
    pub fn new(jobs: Vec<JobSpec>, config: SchedulerConfig) -> Self {
        Self { jobs, config }
    }

    /// Builds a configured simulator holding the request's jobs.
    pub fn into_simulator(self) -> SimResult<Simulator> {
        let mut sim = Simulator::with_config(self.config)?;
        sim.submit_batch(self.jobs)?;
        Ok(sim)
    }

    /// Runs the request and returns the result.
    pub fn run(self) -> SimResult<SimulationResult> {
        let mut sim = self.into_simulator()?;
        sim.run().cloned()
    }
}

/// Multiprocessor scheduling simulator.
///
/// # Example
///
/// ```
/// use u_cpusched::models::Policy;
/// use u_cpusched::scheduler::Simulator;
///
/// let mut sim = Simulator::new();
/// sim.submit_job("P1", 0, 6).unwrap();
/// sim.submit_job("P2", 2, 4).unwrap();
/// sim.configure(2, 2, Policy::Srjf).unwrap();
///
/// sim.run().unwrap();
/// assert_eq!(sim.result_slots_for(1).len(), 3);
/// assert_eq!(sim.metrics().unwrap().totals.waiting, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    ledger: JobLedger,
    driver: SimulationDriver,
    result: Option<SimulationResult>,
}

impl Simulator {
    /// Creates a simulator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator with the given configuration.
    pub fn with_config(config: SchedulerConfig) -> SimResult<Self> {
        let mut sim = Self::new();
        sim.configure_with(config)?;
        Ok(sim)
    }

    /// Adds a job to the ledger.
    ///
    /// Any published result is discarded.
    pub fn submit_job(
        &mut self,
        id: impl Into<String>,
        arrival: Time,
        burst: Time,
    ) -> SimResult<&Job> {
        let idx = self.ledger.submit(id, arrival, burst)?;
        self.invalidate();
        Ok(self.ledger.job(idx))
    }

    /// Adds several jobs; either all are accepted or none.
    pub fn submit_batch(&mut self, jobs: impl IntoIterator<Item = JobSpec>) -> SimResult<usize> {
        let count = self.ledger.submit_batch(jobs)?;
        if count > 0 {
            self.invalidate();
        }
        Ok(count)
    }

    /// Sets processor count, quantum and policy for the next run.
    pub fn configure(
        &mut self,
        processor_count: usize,
        quantum: Time,
        policy: Policy,
    ) -> SimResult<()> {
        self.configure_with(
            SchedulerConfig::new(policy)
                .with_processors(processor_count)
                .with_quantum(quantum),
        )
    }

    /// Replaces the whole configuration for the next run.
    ///
    /// A published result keeps the configuration it was produced with.
    pub fn configure_with(&mut self, config: SchedulerConfig) -> SimResult<()> {
        self.driver.set_config(config).inspect_err(|e| {
            warn!(error = %e, "configuration rejected");
        })
    }

    /// Configuration of the next run.
    pub fn config(&self) -> &SchedulerConfig {
        self.driver.config()
    }

    /// Submitted jobs, with outcomes of the last run.
    pub fn jobs(&self) -> &[Job] {
        self.ledger.jobs()
    }

    /// Driver lifecycle state.
    pub fn state(&self) -> DriverState {
        self.driver.state()
    }

    /// Simulates every submitted job to completion.
    ///
    /// # Errors
    /// - [`SimError::EmptyJobSet`] with no jobs; nothing changes.
    /// - [`SimError::InvalidConfig`] for an invalid configuration.
    /// - [`SimError::Invariant`] on an engine defect; the previous result is
    ///   discarded.
    pub fn run(&mut self) -> SimResult<&SimulationResult> {
        if self.ledger.is_empty() {
            return Err(SimError::EmptyJobSet);
        }

        let timeline = match self.driver.run(&mut self.ledger) {
            Ok(timeline) => timeline,
            Err(e) => {
                if e.is_defect() {
                    self.result = None;
                }
                return Err(e);
            }
        };

        let config = self.driver.config().clone();
        let metrics = RunMetrics::calculate(&timeline, self.ledger.jobs(), config.processor_count);
        Ok(self.result.insert(SimulationResult {
            config,
            timeline,
            metrics,
        }))
    }

    /// Last published result.
    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    /// Slots of one processor (1-based) from the last result, in time order.
    ///
    /// Empty if there is no result or the processor was never used.
    pub fn result_slots_for(&self, processor: usize) -> Vec<&TimelineSlot> {
        self.result
            .as_ref()
            .map(|r| r.slots_for_processor(processor))
            .unwrap_or_default()
    }

    /// Metrics of the last result.
    pub fn metrics(&self) -> Option<&RunMetrics> {
        self.result.as_ref().map(|r| &r.metrics)
    }

    /// Removes a job by id and discards any published result.
    pub fn remove_job(&mut self, id: &str) -> Option<Job> {
        let removed = self.ledger.remove(id)?;
        self.invalidate();
        Some(removed)
    }

    /// Clears the result and every job's run-state.
    pub fn reset(&mut self) {
        self.result = None;
        self.driver.reset(&mut self.ledger);
    }

    fn invalidate(&mut self) {
        if self.result.is_some() || self.driver.state() != DriverState::Idle {
            self.reset();
        }
    }
}
