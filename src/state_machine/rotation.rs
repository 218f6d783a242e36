//! Rotation lifecycle state machine
//!
//! Decides when a previously derived target instant has been passed and the
//! owning record must be regenerated.
//!
//! # States
//!
//! - Fresh: target in the future (or equal to now)
//! - Expired: the current instant has passed the target
//! - Replacing: transient, a forced replacement is in progress
//!
//! # Inputs
//!
//! - Expire: expiry observed during evaluation
//! - BeginReplacement: the surrounding evaluation flagged the record for
//!   replacement (expiry, or a structural base/trigger change)
//! - CompleteReplacement: the replacement record has been materialized
//!
//! Expiry itself is decided by [`evaluate`], a pure function of a single
//! `now` snapshot and the persisted target. Equality does not expire: a
//! record evaluated at exactly its target instant is still Fresh.

use chrono::{DateTime, Utc};

use super::{StateMachine, TransitionError, TransitionResult};

/// Rotation lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// Target in the future or absent
    Fresh,

    /// The current instant has passed the target
    Expired,

    /// A forced replacement is in progress
    Replacing,
}

/// Rotation lifecycle input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationEvent {
    /// Expiry observed during evaluation
    Expire,

    /// The whole record was flagged for replacement
    BeginReplacement,

    /// The replacement record has been materialized
    CompleteReplacement,
}

impl StateMachine for RotationState {
    type Input = RotationEvent;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use RotationEvent::*;
        use RotationState::*;

        match (self, input) {
            // Expiry is monotonic for a fixed target
            (Fresh, Expire) => Ok((Expired, ())),
            (Expired, Expire) => Ok((Expired, ())),

            // Replacement can be forced from either settled state; a
            // structural change replaces even a Fresh record
            (Fresh, BeginReplacement) => Ok((Replacing, ())),
            (Expired, BeginReplacement) => Ok((Replacing, ())),

            (Replacing, CompleteReplacement) => Ok((Fresh, ())),

            (from, input) => Err(TransitionError::InvalidTransition {
                from: format!("{from:?}"),
                input: format!("{input:?}"),
            }),
        }
    }
}

/// Evaluate expiry for a single observation of the clock
///
/// `Expired` iff `now > target`, strict inequality. Callers must snapshot
/// `now` once per evaluation and reuse it for every decision in that pass.
pub fn evaluate(now: DateTime<Utc>, target: DateTime<Utc>) -> RotationState {
    if now > target {
        RotationState::Expired
    } else {
        RotationState::Fresh
    }
}
