//! Lifecycle engine
//!
//! The facade the surrounding lifecycle framework drives: create a record,
//! plan a re-evaluation against persisted state, execute a forced
//! replacement, project read fields, import external identifiers, and run
//! the before/after lifecycle delays.
//!
//! Every evaluation snapshots the clock exactly once and uses that single
//! instant for all decisions in the pass, so re-running a plan with the
//! same inputs yields the same outcome.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::errors::TemporalResult;
use crate::offset::{self, RotationSpec};
use crate::record::{PersistedRecord, RotationRecord, TimeParts, TriggerSet};
use crate::sleep::{CancelToken, DelaySpec, SleepScheduler};
use crate::state_codec;
use crate::state_machine::rotation::{self, RotationEvent, RotationState};
use crate::state_machine::StateMachine;
use crate::timestamp;

/// A rotation record together with its caller-owned triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRecord {
    pub record: RotationRecord,
    pub triggers: TriggerSet,
}

impl ManagedRecord {
    /// Flat persisted projection of this record
    pub fn persisted(&self) -> PersistedRecord {
        PersistedRecord::from_record(&self.record, &self.triggers)
    }
}

/// Outcome of a plan/diff evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Nothing changed; persisted state stands
    NoChange,

    /// Only the spec changed; the target is recomputed in place from the
    /// persisted base
    Recompute { target: DateTime<Utc> },

    /// The record must be destroyed and recreated: its target expired, or
    /// its base/triggers changed structurally
    ForceReplace,
}

/// Temporal state engine over an injectable clock
#[derive(Debug, Clone)]
pub struct Engine<C: Clock> {
    clock: C,
}

impl Engine<SystemClock> {
    /// Engine reading the system wall clock
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Create a record, pinning its base instant
    ///
    /// The base defaults to the current instant; an explicit override must
    /// parse as canonical timestamp text. A freshly created record is never
    /// evaluated for expiry in the same pass: expiry checks only happen in
    /// [`Engine::plan`], which runs against already-persisted state. That
    /// keeps degenerate (zero-length) offsets from replacing forever.
    pub fn create(
        &self,
        base_override: Option<&str>,
        spec: RotationSpec,
        triggers: TriggerSet,
    ) -> TemporalResult<ManagedRecord> {
        let base = match base_override {
            Some(text) => timestamp::parse(text)?,
            None => self.clock.now(),
        };
        let record = RotationRecord::derive(base, spec)?;
        info!(
            base = %record.base_text(),
            target = %record.target_text(),
            "created rotation record"
        );
        Ok(ManagedRecord { record, triggers })
    }

    /// Plan a re-evaluation of a persisted record
    ///
    /// Forces replacement when the target expired or when the base/triggers
    /// differ structurally; proposes an in-place target recompute when only
    /// the spec changed; otherwise reports no change.
    pub fn plan(
        &self,
        persisted: &ManagedRecord,
        proposed_spec: &RotationSpec,
        proposed_triggers: &TriggerSet,
        proposed_base: Option<&str>,
    ) -> TemporalResult<PlanOutcome> {
        // Single clock read for the whole pass
        let now = self.clock.now();

        if let Some(text) = proposed_base {
            let base = timestamp::parse(text)?;
            if base != persisted.record.base {
                debug!(proposed = %text, "base changed, forcing replacement");
                return Ok(PlanOutcome::ForceReplace);
            }
        }

        if proposed_triggers != &persisted.triggers {
            debug!("triggers changed, forcing replacement");
            return Ok(PlanOutcome::ForceReplace);
        }

        if rotation::evaluate(now, persisted.record.target) == RotationState::Expired {
            info!(
                target = %persisted.record.target_text(),
                observed = %timestamp::format(now),
                "rotation target expired, forcing replacement"
            );
            return Ok(PlanOutcome::ForceReplace);
        }

        if proposed_spec != &persisted.record.spec {
            proposed_spec.validate()?;
            let target = offset::resolve(persisted.record.base, proposed_spec)?;
            debug!(target = %timestamp::format(target), "spec changed, recomputing target");
            return Ok(PlanOutcome::Recompute { target });
        }

        Ok(PlanOutcome::NoChange)
    }

    /// Execute a forced replacement, absorbing drift
    ///
    /// The new base is the replacement-time instant, not the missed target,
    /// so the gap between when rotation was due and when it was observed
    /// becomes part of the new cycle instead of compounding. Offset specs
    /// re-derive their target from the new base; an absolute target is kept
    /// verbatim and will re-expire until the caller supplies a new one.
    pub fn replace(&self, expired: &ManagedRecord) -> TemporalResult<ManagedRecord> {
        let now = self.clock.now();

        // Walk the rotation lifecycle: either settled state (an expired
        // target, or a Fresh record with a structural change) may begin a
        // replacement, and only a completed replacement is Fresh again
        let settled = rotation::evaluate(now, expired.record.target);
        let (in_progress, _) = settled.transition(&RotationEvent::BeginReplacement)?;

        let record = RotationRecord::derive(now, expired.record.spec.clone())?;

        let (completed, _) = in_progress.transition(&RotationEvent::CompleteReplacement)?;
        debug_assert_eq!(completed, RotationState::Fresh);
        info!(
            old_target = %expired.record.target_text(),
            new_base = %record.base_text(),
            new_target = %record.target_text(),
            "replaced rotation record"
        );
        Ok(ManagedRecord {
            record,
            triggers: expired.triggers.clone(),
        })
    }

    /// Import a record from an external identifier
    pub fn import(&self, text: &str) -> TemporalResult<ManagedRecord> {
        let record = state_codec::decode(text)?;
        Ok(ManagedRecord {
            record,
            triggers: TriggerSet::new(),
        })
    }
}

/// Decomposed read projection of a persisted record
///
/// Derived purely from the persisted instants; never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadView {
    pub base: TimeParts,
    pub target: TimeParts,
    pub base_rfc3339: String,
    pub target_rfc3339: String,
}

/// Project the display fields of a record
pub fn read(record: &RotationRecord) -> ReadView {
    ReadView {
        base: TimeParts::of(record.base),
        target: TimeParts::of(record.target),
        base_rfc3339: record.base_text(),
        target_rfc3339: record.target_text(),
    }
}

/// Run the pre-creation delay, if configured
///
/// Invoked at most once per creation; a re-evaluation that changes neither
/// the delay spec nor the owning record must not call this again.
pub async fn delay_before(spec: &DelaySpec, cancel: &CancelToken) -> TemporalResult<()> {
    spec.validate()?;
    match spec.before {
        Some(duration) => SleepScheduler::delay(duration, cancel).await,
        None => Ok(()),
    }
}

/// Run the post-destruction delay, if configured
///
/// Same single-invocation contract as [`delay_before`], tied to the
/// destruction boundary.
pub async fn delay_after(spec: &DelaySpec, cancel: &CancelToken) -> TemporalResult<()> {
    spec.validate()?;
    match spec.after {
        Some(duration) => SleepScheduler::delay(duration, cancel).await,
        None => Ok(()),
    }
}
