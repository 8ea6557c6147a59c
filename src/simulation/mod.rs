//! Discrete-event simulation engine.
//!
//! The engine owns its working state exclusively for the duration of a run:
//! the [`JobLedger`] (arena of jobs and their run-state), the
//! [`ProcessorBank`] (per-processor availability and occupancy) and the
//! [`EventClock`]. The [`SimulationDriver`] ties them together with a
//! [`DispatchPolicy`](crate::dispatching::DispatchPolicy).
//!
//! Runs are single-threaded and deterministic: one decision round completes
//! before the next begins, and nothing is published until the run ends.
//!
//! # Reference
//! Law (2015), "Simulation Modeling and Analysis", Ch. 1.4: Next-event time advance

mod clock;
mod driver;
mod ledger;
mod processor;

pub use clock::{next_event_time, EventClock};
pub use driver::{simulate, DriverState, SimulationDriver};
pub use ledger::{JobIdx, JobLedger};
pub use processor::{Processor, ProcessorBank};
