//! Widget states - Lifecycle of the chat widget

use serde::{Deserialize, Serialize};

/// The possible states of a chat widget.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    /// Mounted but hidden (floating button only).
    #[default]
    Closed,

    /// Visible and idle, awaiting user input.
    Open,

    /// Visible with bot replies still "typing".
    AwaitingReply {
        /// Replies scheduled but not yet shown.
        pending: usize,
    },

    /// Torn down; transcript and context are gone (terminal state).
    Unmounted,
}

impl WidgetState {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unmounted)
    }

    /// Check if the widget is visible.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::AwaitingReply { .. })
    }

    /// Check if this state allows user input.
    pub fn accepts_user_input(&self) -> bool {
        self.is_open()
    }

    /// Number of replies still pending.
    pub fn pending(&self) -> usize {
        match self {
            Self::AwaitingReply { pending } => *pending,
            _ => 0,
        }
    }

    /// Get a human-readable description of the current state.
    pub fn description(&self) -> &str {
        match self {
            Self::Closed => "Closed",
            Self::Open => "Ready for input",
            Self::AwaitingReply { .. } => "Typing...",
            Self::Unmounted => "Unmounted",
        }
    }
}
