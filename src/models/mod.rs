//! Simulation domain models.
//!
//! Input facts (`JobSpec`, `SchedulerConfig`) and output records
//! (`Timeline`, `TimelineSlot`) shared by the engine and its collaborators.
//!
//! # Domain Mappings
//!
//! | u-cpusched | Textbook | Gantt chart |
//! |------------|----------|-------------|
//! | Job | Process | Row label |
//! | Processor | CPU | Chart row |
//! | TimelineSlot | CPU burst slice | Bar |
//! | Timeline | Schedule | Chart |

mod config;
mod job;
mod timeline;

pub use config::{Policy, SchedulerConfig};
pub use job::{Job, JobSpec, Time};
pub use timeline::{Occupant, Timeline, TimelineSlot};
