//! Shortest-Remaining-Job-First with a bounded quantum.

use super::DispatchPolicy;
use crate::models::Time;
use crate::simulation::{JobIdx, JobLedger, ProcessorBank};

/// Preemptive Shortest-Remaining-Job-First.
///
/// Eligible jobs (arrived, unfinished, not on a processor) are ordered by
/// remaining time ascending. Equal remaining times keep ledger order.
///
/// Preemption happens only at slice boundaries: a running slice is never
/// cut short, but a shorter job that arrived meanwhile wins the next free
/// processor.
///
/// # Reference
/// Schrage (1968), optimal for mean flow time on a single machine
#[derive(Debug, Clone, Copy, Default)]
pub struct Srjf;

impl Srjf {
    /// Creates the policy. It carries no state between decisions.
    pub fn new() -> Self {
        Self
    }
}

impl DispatchPolicy for Srjf {
    fn name(&self) -> &'static str {
        "SRJF"
    }

    fn description(&self) -> &'static str {
        "Shortest Remaining Job First"
    }

    fn ready_set(&self, now: Time, ledger: &JobLedger, bank: &ProcessorBank) -> Vec<JobIdx> {
        let mut ready: Vec<JobIdx> = ledger
            .iter()
            .filter(|(idx, job)| {
                job.has_arrived(now) && !job.is_complete() && !bank.is_running(*idx)
            })
            .map(|(idx, _)| idx)
            .collect();
        // Stable: ties stay in ledger order
        ready.sort_by_key(|&idx| ledger.job(idx).remaining());
        ready
    }

    fn select(&mut self, now: Time, ledger: &JobLedger, bank: &ProcessorBank) -> Option<JobIdx> {
        self.ready_set(now, ledger, bank).first().copied()
    }
}
