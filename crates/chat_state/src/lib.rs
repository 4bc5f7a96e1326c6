//! chat_state - Widget controller for the portfolio chat
//!
//! This crate owns the per-session state the responder deliberately does not:
//! the transcript, the current context tag, and the widget lifecycle, with
//! typing-delayed replies that are cancelled when the widget goes away.

pub mod error;
pub mod machine;
pub mod widget;

// Re-export commonly used types
pub use error::WidgetError;
pub use machine::{StateTransition, TransitionError, WidgetEvent, WidgetState, WidgetStateMachine};
pub use widget::{ChatWidget, SubmitOutcome};
