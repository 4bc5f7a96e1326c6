//! Widget events - Inputs that drive the widget state machine

use serde::{Deserialize, Serialize};

/// Events that can trigger widget state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetEvent {
    /// The floating button was clicked.
    Opened,

    /// The close button was clicked.
    Closed,

    /// A non-empty utterance was submitted (typed or quick reply).
    UserSubmitted,

    /// A pending bot reply was appended to the transcript.
    ReplyDelivered,

    /// The widget (or page) is being torn down.
    Unmounted,
}

impl std::fmt::Display for WidgetEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::UserSubmitted => "user_submitted",
            Self::ReplyDelivered => "reply_delivered",
            Self::Unmounted => "unmounted",
        };
        f.write_str(name)
    }
}
