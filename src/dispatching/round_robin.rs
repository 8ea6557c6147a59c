//! Round Robin over one global FIFO ready queue.

use std::collections::VecDeque;

use super::DispatchPolicy;
use crate::models::Time;
use crate::simulation::{JobIdx, JobLedger, ProcessorBank};

/// Round Robin.
///
/// Jobs join the back of the queue once, when the clock reaches their
/// arrival (same-instant arrivals in ledger order). A job whose slice
/// expires with work remaining rejoins the back. Free processors take from
/// the front in index order. A running job is never in the queue.
///
/// Within one decision time, released jobs are requeued before that
/// instant's arrivals are admitted.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    queue: VecDeque<JobIdx>,
    /// Jobs by (arrival, ledger index), consumed through `cursor`.
    arrivals: Vec<JobIdx>,
    cursor: usize,
}

impl RoundRobin {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting in the ready queue.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

impl DispatchPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn description(&self) -> &'static str {
        "Round Robin"
    }

    fn start(&mut self, ledger: &JobLedger) {
        self.queue.clear();
        self.arrivals = (0..ledger.len()).collect();
        self.arrivals.sort_by_key(|&idx| ledger.job(idx).arrival);
        self.cursor = 0;
    }

    fn admit(&mut self, now: Time, ledger: &JobLedger) {
        // `<=` rather than `==`: a skipped arrival is still captured.
        while let Some(&idx) = self.arrivals.get(self.cursor) {
            if !ledger.job(idx).has_arrived(now) {
                break;
            }
            self.queue.push_back(idx);
            self.cursor += 1;
        }
    }

    fn requeue(&mut self, job: JobIdx, ledger: &JobLedger) {
        if !ledger.is_complete(job) {
            self.queue.push_back(job);
        }
    }

    fn ready_set(&self, _now: Time, _ledger: &JobLedger, _bank: &ProcessorBank) -> Vec<JobIdx> {
        self.queue.iter().copied().collect()
    }

    fn select(&mut self, _now: Time, _ledger: &JobLedger, _bank: &ProcessorBank) -> Option<JobIdx> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(jobs: &[(&str, Time, Time)]) -> JobLedger {
        let mut ledger = JobLedger::new();
        for &(id, arrival, burst) in jobs {
            ledger.submit(id, arrival, burst).unwrap();
        }
        ledger
    }

    #[test]
    fn test_admits_in_arrival_order() {
        let ledger = ledger(&[("late", 4, 1), ("early", 1, 1), ("first", 0, 1)]);
        let bank = ProcessorBank::new(1);
        let mut rr = RoundRobin::new();
        rr.start(&ledger);

        rr.admit(0, &ledger);
        assert_eq!(rr.ready_set(0, &ledger, &bank), vec![2]);

        // Clock jumped past t=1: the job is still captured
        rr.admit(5, &ledger);
        assert_eq!(rr.ready_set(5, &ledger, &bank), vec![2, 1, 0]);
    }

    #[test]
    fn test_admits_each_job_once() {
        let ledger = ledger(&[("P1", 0, 3)]);
        let mut rr = RoundRobin::new();
        rr.start(&ledger);
        rr.admit(0, &ledger);
        rr.admit(0, &ledger);
        rr.admit(1, &ledger);
        assert_eq!(rr.queued(), 1);
    }

    #[test]
    fn test_requeue_goes_to_back() {
        let mut ledger = ledger(&[("P1", 0, 5), ("P2", 0, 3)]);
        let bank = ProcessorBank::new(1);
        let mut rr = RoundRobin::new();
        rr.start(&ledger);
        rr.admit(0, &ledger);

        assert_eq!(rr.select(0, &ledger, &bank), Some(0));
        ledger.consume(0, 2).unwrap();
        rr.requeue(0, &ledger);
        assert_eq!(rr.select(2, &ledger, &bank), Some(1));
        assert_eq!(rr.select(2, &ledger, &bank), Some(0));
        assert_eq!(rr.select(2, &ledger, &bank), None);
    }

    #[test]
    fn test_requeue_skips_finished_job() {
        let mut ledger = ledger(&[("P1", 0, 2)]);
        let mut rr = RoundRobin::new();
        rr.start(&ledger);
        ledger.consume(0, 2).unwrap();
        rr.requeue(0, &ledger);
        assert_eq!(rr.queued(), 0);
    }
}
