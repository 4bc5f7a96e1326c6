//! Widget error types

use thiserror::Error;

use crate::machine::TransitionError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Chat widget is closed")]
    NotOpen,

    #[error("Chat widget has been unmounted")]
    Unmounted,

    #[error("No quick reply at index {index} ({available} available)")]
    UnknownQuickReply { index: usize, available: usize },

    #[error("Delayed replies need a tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
