//! Ready-set policies.
//!
//! A policy decides which jobs may run at a decision time and in what order
//! they are offered to free processors. The simulation driver is
//! policy-agnostic: it releases occupants, lets the policy admit arrivals,
//! then asks it for one job per free processor.
//!
//! # Usage
//!
//! ```
//! use u_cpusched::models::Policy;
//!
//! let policy = Policy::RoundRobin.build();
//! assert_eq!(policy.name(), "RR");
//! ```
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.3
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4

mod round_robin;
mod srjf;

pub use round_robin::RoundRobin;
pub use srjf::Srjf;

use std::fmt::Debug;

use crate::models::Time;
use crate::simulation::{JobIdx, JobLedger, ProcessorBank};

/// Strategy for selecting the next job to dispatch.
///
/// One instance serves exactly one run. The driver calls, per decision time:
/// [`requeue`](Self::requeue) for every job released with work remaining,
/// then [`admit`](Self::admit), then [`select`](Self::select) once per free
/// processor in index order until it returns `None`.
///
/// A job returned by `select` is dispatched immediately, so it occupies a
/// processor before the next `select` call in the same round.
pub trait DispatchPolicy: Send + Sync + Debug {
    /// Policy name (e.g., "SRJF", "RR").
    fn name(&self) -> &'static str;

    /// Policy description.
    fn description(&self) -> &'static str {
        self.name()
    }

    /// Called once before the first decision time of a run.
    fn start(&mut self, _ledger: &JobLedger) {}

    /// Captures jobs that have arrived by `now`.
    fn admit(&mut self, _now: Time, _ledger: &JobLedger) {}

    /// Takes back a job whose slice ended with work remaining.
    fn requeue(&mut self, _job: JobIdx, _ledger: &JobLedger) {}

    /// Eligible jobs at `now`, in the order they would be offered.
    fn ready_set(&self, now: Time, ledger: &JobLedger, bank: &ProcessorBank) -> Vec<JobIdx>;

    /// Removes and returns the next job to dispatch, if any.
    fn select(&mut self, now: Time, ledger: &JobLedger, bank: &ProcessorBank) -> Option<JobIdx>;
}
