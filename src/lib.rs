//! Multiprocessor CPU scheduling simulator.
//!
//! Simulates a set of jobs on identical processors under preemptive
//! Shortest-Remaining-Job-First with a time quantum, or Round Robin, and
//! reports the resulting per-processor timeline with waiting, turnaround
//! and response metrics.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `JobSpec`, `SchedulerConfig`,
//!   `Policy`, `Timeline`, `TimelineSlot`
//! - **`dispatching`**: Ready-set policies (`Srjf`, `RoundRobin`)
//! - **`simulation`**: Discrete-event engine: job ledger, processor bank,
//!   event clock, driver
//! - **`scheduler`**: `Simulator` facade and `RunMetrics`
//! - **`validation`**: Input checks and timeline audit
//! - **`workload`**: Seeded synthetic job batches
//! - **`error`**: `SimError` and `InvariantViolation`
//!
//! # Architecture
//!
//! Time is discrete and advances only to decision points (a processor
//! finishing its slice, or a job arriving). Runs are single-threaded and
//! deterministic; a run publishes a complete result or nothing.
//!
//! # Example
//!
//! ```
//! use u_cpusched::{models::Policy, Simulator};
//!
//! let mut sim = Simulator::new();
//! sim.submit_job("P1", 0, 5).unwrap();
//! sim.submit_job("P2", 1, 3).unwrap();
//! sim.configure(1, 3, Policy::RoundRobin).unwrap();
//! sim.run().unwrap();
//!
//! let metrics = sim.metrics().unwrap();
//! assert_eq!(metrics.totals.waiting, 5);
//! ```
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4
//! - Law (2015), "Simulation Modeling and Analysis"

pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod simulation;
pub mod validation;
pub mod workload;

pub use error::{InvariantViolation, SimError, SimResult};
pub use scheduler::{RunMetrics, SimulationRequest, SimulationResult, Simulator};
