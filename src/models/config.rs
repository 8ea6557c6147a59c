//! Scheduler configuration.

use serde::{Deserialize, Serialize};

use super::Time;
use crate::dispatching::{DispatchPolicy, RoundRobin, Srjf};
use crate::error::{SimError, SimResult};

/// Scheduling discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Preemptive Shortest-Remaining-Job-First, bounded by the quantum.
    #[default]
    Srjf,
    /// Round Robin over one global FIFO queue.
    RoundRobin,
}

impl Policy {
    /// Creates a fresh ready-set strategy for one run.
    pub fn build(self) -> Box<dyn DispatchPolicy> {
        match self {
            Policy::Srjf => Box::new(Srjf::new()),
            Policy::RoundRobin => Box::new(RoundRobin::new()),
        }
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Policy::Srjf => "SRJF",
            Policy::RoundRobin => "RR",
        }
    }
}

/// Parameters of one simulation run.
///
/// Immutable for the duration of a run.
///
/// # Example
/// ```
/// use u_cpusched::models::{Policy, SchedulerConfig};
///
/// let config = SchedulerConfig::new(Policy::RoundRobin)
///     .with_processors(2)
///     .with_quantum(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of processors (≥ 1).
    pub processor_count: usize,
    /// Maximum contiguous slice length (≥ 1 tick).
    pub quantum: Time,
    /// Scheduling discipline.
    pub policy: Policy,
    /// Emit `Idle` slots for processor gaps.
    #[serde(default)]
    pub idle_slots: bool,
}

impl SchedulerConfig {
    /// Creates a single-processor configuration with quantum 1.
    pub fn new(policy: Policy) -> Self {
        Self {
            processor_count: 1,
            quantum: 1,
            policy,
            idle_slots: false,
        }
    }

    /// Sets the processor count.
    pub fn with_processors(mut self, processor_count: usize) -> Self {
        self.processor_count = processor_count;
        self
    }

    /// Sets the quantum.
    pub fn with_quantum(mut self, quantum: Time) -> Self {
        self.quantum = quantum;
        self
    }

    /// Enables or disables idle-slot emission.
    pub fn with_idle_slots(mut self, idle_slots: bool) -> Self {
        self.idle_slots = idle_slots;
        self
    }

    /// Checks the processor count and quantum.
    pub fn validate(&self) -> SimResult<()> {
        if self.processor_count < 1 {
            return Err(SimError::InvalidConfig(format!(
                "processor count must be at least 1, got {}",
                self.processor_count
            )));
        }
        if self.quantum < 1 {
            return Err(SimError::InvalidConfig(format!(
                "quantum must be at least 1, got {}",
                self.quantum
            )));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}
