//! Temporal state engine for declarative infrastructure
//!
//! Declarative tooling cannot read the wall clock during planning without
//! producing perpetual diffs. This crate supplies the explicitly
//! materialized substitute: pin a base instant, derive a target from it by
//! calendar/duration offset, decide when that target has elapsed and the
//! owning record must be regenerated, and run cancellable delays around
//! lifecycle transitions.

pub mod clock;
pub mod engine;
pub mod errors;
pub mod offset;
pub mod record;
pub mod sleep;
pub mod state_codec;
pub mod state_machine;
pub mod timestamp;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{delay_after, delay_before, read, Engine, ManagedRecord, PlanOutcome, ReadView};
pub use errors::{TemporalError, TemporalResult};
pub use offset::{OffsetSpec, OffsetUnit, RotationSpec};
pub use record::{PersistedRecord, RotationRecord, TimeParts, TriggerSet};
pub use sleep::{CancelToken, DelaySpec, SleepScheduler};
pub use state_machine::rotation::{evaluate, RotationEvent, RotationState};
