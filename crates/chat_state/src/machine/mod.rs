//! State machine module
//!
//! Contains the FSM for the chat widget lifecycle.

mod events;
mod states;
mod transitions;

pub use events::WidgetEvent;
pub use states::WidgetState;
pub use transitions::{StateTransition, TransitionError, WidgetStateMachine};
