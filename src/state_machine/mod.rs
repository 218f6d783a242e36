//! Finite state machine abstractions
//!
//! Generic, reusable state machine support for modeling record lifecycles.
//! All state machines here are pure functional: transitions are
//! deterministic functions of `(state, input)` with no side effects and no
//! clock access, which keeps them testable without time mocking.

pub mod rotation;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("invalid transition from {from} on {input}")]
    InvalidTransition { from: String, input: String },
}

/// Trait for finite state machines
///
/// Implement this trait to define a state machine with typed states,
/// inputs, and outputs.
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    ///
    /// # Returns
    /// - Ok((new_state, output)) if the transition is valid
    /// - Err(TransitionError) otherwise
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }
}
