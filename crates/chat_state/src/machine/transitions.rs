//! State transitions - FSM transition logic
//!
//! Implements the state machine that handles event-driven widget transitions.

use thiserror::Error;

use super::events::WidgetEvent;
use super::states::WidgetState;

/// Error type for invalid state transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} with event {event}")]
    InvalidTransition { from: WidgetState, event: WidgetEvent },

    #[error("State machine is in terminal state: {0:?}")]
    TerminalState(WidgetState),
}

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: WidgetState,
    /// The state after the transition.
    pub to: WidgetState,
    /// The event that triggered the transition.
    pub event: WidgetEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for the widget lifecycle.
#[derive(Debug, Clone)]
pub struct WidgetStateMachine {
    /// Current state.
    current_state: WidgetState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for WidgetStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetStateMachine {
    /// Create a new state machine in Closed state.
    pub fn new() -> Self {
        Self::with_state(WidgetState::Closed)
    }

    /// Create a state machine with a specific initial state.
    pub fn with_state(state: WidgetState) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &WidgetState {
        &self.current_state
    }

    /// Get the transition history.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Apply an event, rejecting events the current state does not accept.
    pub fn handle_event(&mut self, event: WidgetEvent) -> Result<StateTransition, TransitionError> {
        if self.current_state.is_terminal() {
            return Err(TransitionError::TerminalState(self.current_state.clone()));
        }

        let old_state = self.current_state.clone();
        let new_state = Self::compute_next_state(&old_state, &event).ok_or_else(|| {
            TransitionError::InvalidTransition {
                from: old_state.clone(),
                event: event.clone(),
            }
        })?;
        let changed = old_state != new_state;

        tracing::trace!(from = ?old_state, to = ?new_state, %event, "Widget transition");
        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        // Add to history
        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        Ok(transition)
    }

    /// Compute the next state, or `None` if the event is not valid here.
    fn compute_next_state(state: &WidgetState, event: &WidgetEvent) -> Option<WidgetState> {
        use WidgetEvent as E;
        use WidgetState as S;

        let next = match (state, event) {
            (_, E::Unmounted) => S::Unmounted,

            // ========== Visibility ==========
            (S::Closed, E::Opened) => S::Open,
            (S::Closed, E::Closed) => S::Closed,
            (S::Open | S::AwaitingReply { .. }, E::Opened) => state.clone(),
            // Closing drops every pending reply.
            (S::Open | S::AwaitingReply { .. }, E::Closed) => S::Closed,

            // ========== Conversation ==========
            (S::Open, E::UserSubmitted) => S::AwaitingReply { pending: 1 },
            (S::AwaitingReply { pending }, E::UserSubmitted) => S::AwaitingReply {
                pending: pending + 1,
            },
            (S::AwaitingReply { pending }, E::ReplyDelivered) if *pending > 1 => {
                S::AwaitingReply {
                    pending: pending - 1,
                }
            }
            (S::AwaitingReply { .. }, E::ReplyDelivered) => S::Open,

            _ => return None,
        };
        Some(next)
    }

    /// Check if a transition is valid without executing it.
    pub fn can_handle(&self, event: &WidgetEvent) -> bool {
        !self.current_state.is_terminal()
            && Self::compute_next_state(&self.current_state, event).is_some()
    }
}
