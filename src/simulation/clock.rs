//! Event clock.
//!
//! Time only moves to instants where a decision can change: a processor
//! finishing its slice, or a pending job arriving. Nothing happens between
//! two such instants, so the clock never single-steps over them.

use tracing::{debug, error};

use super::{JobLedger, ProcessorBank};
use crate::models::Time;

/// Next decision time after `now`.
///
/// The minimum of every processor `free_at > now` and every arrival
/// `> now` of an unfinished job. Arrivals are always candidates, so the
/// clock stops on each of them.
pub fn next_event_time(now: Time, bank: &ProcessorBank, ledger: &JobLedger) -> Option<Time> {
    let next_free = bank.next_free_after(now);
    let next_arrival = ledger
        .jobs()
        .iter()
        .filter(|j| !j.is_complete() && j.arrival > now)
        .map(|j| j.arrival)
        .min();

    match (next_free, next_arrival) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Simulated clock for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventClock {
    now: Time,
    fallbacks: usize,
}

impl EventClock {
    /// Creates a clock at t=0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time.
    #[inline]
    pub fn now(&self) -> Time {
        self.now
    }

    /// Times the clock had no next event and stepped by one tick instead.
    ///
    /// Always zero for a correct engine.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    /// Moves to the next decision time and returns it.
    ///
    /// With no next event while work remains, the engine is in a state it
    /// should never reach. This is logged as a defect (and asserted in debug
    /// builds); the clock then steps by one tick so the run cannot spin.
    pub fn advance(&mut self, bank: &ProcessorBank, ledger: &JobLedger) -> Time {
        match next_event_time(self.now, bank, ledger) {
            Some(next) => {
                debug!(from = self.now, to = next, "clock advanced");
                self.now = next;
            }
            None => {
                error!(
                    now = self.now,
                    remaining = ledger.total_remaining(),
                    "no next event with work remaining; stepping one tick"
                );
                debug_assert!(
                    ledger.all_complete(),
                    "event clock stalled at t={} with work remaining",
                    self.now
                );
                self.fallbacks += 1;
                self.now += 1;
            }
        }
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobSpec;

    fn ledger(jobs: &[(&str, Time, Time)]) -> JobLedger {
        JobLedger::from_specs(jobs.iter().map(|&(id, a, b)| JobSpec::new(id, a, b))).unwrap()
    }

    #[test]
    fn test_stops_on_every_arrival() {
        let ledger = ledger(&[("P1", 3, 1), ("P2", 7, 1), ("P3", 7, 2), ("P4", 12, 1)]);
        let bank = ProcessorBank::new(1);
        let mut clock = EventClock::new();

        assert_eq!(clock.advance(&bank, &ledger), 3);
        assert_eq!(clock.advance(&bank, &ledger), 7);
        assert_eq!(clock.advance(&bank, &ledger), 12);
        assert_eq!(clock.fallbacks(), 0);
    }

    #[test]
    fn test_arrival_before_processor_free() {
        let ledger = ledger(&[("P1", 0, 10), ("P2", 4, 1)]);
        let mut bank = ProcessorBank::new(1);
        bank.assign(0, 0, ledger.job(0), 10, 0).unwrap();

        // Arrival at 4 comes before the slice ends at 10
        assert_eq!(next_event_time(0, &bank, &ledger), Some(4));
        assert_eq!(next_event_time(4, &bank, &ledger), Some(10));
    }

    #[test]
    fn test_jumps_over_quiet_periods() {
        let ledger = ledger(&[("P1", 0, 2), ("P2", 100, 1)]);
        let mut bank = ProcessorBank::new(1);
        bank.assign(0, 0, ledger.job(0), 2, 0).unwrap();

        assert_eq!(next_event_time(0, &bank, &ledger), Some(2));
        assert_eq!(next_event_time(2, &bank, &ledger), Some(100));
    }

    #[test]
    fn test_ignores_finished_jobs() {
        let mut ledger = ledger(&[("P1", 5, 1)]);
        ledger.consume(0, 1).unwrap();
        let bank = ProcessorBank::new(1);
        assert_eq!(next_event_time(0, &bank, &ledger), None);
    }

    #[test]
    fn test_no_event_when_nothing_pending() {
        // Arrived, unfinished, nothing running: a state the driver never
        // leaves without dispatching.
        let ledger = ledger(&[("P1", 0, 3)]);
        let bank = ProcessorBank::new(2);
        assert_eq!(next_event_time(0, &bank, &ledger), None);
    }
}
