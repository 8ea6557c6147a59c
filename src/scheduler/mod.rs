//! Simulator facade and run metrics.
//!
//! [`Simulator`] is the entry point: submit jobs, configure processors,
//! quantum and policy, run, then query the published timeline and metrics.
//! [`SimulationRequest`] does the same in one step from a serde-loadable
//! description.
//!
//! # Metrics
//!
//! [`RunMetrics`] computes the classical CPU scheduling criteria: waiting,
//! turnaround and response time per job with totals and averages, plus
//! makespan, utilization and preemption count.
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4

mod kpi;
mod simulator;

pub use kpi::{JobMetrics, MetricAverages, MetricTotals, RunMetrics};
pub use simulator::{SimulationRequest, SimulationResult, Simulator};
