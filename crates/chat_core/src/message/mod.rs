//! Message module - Transcript types
//!
//! Shared message types used by the widget and its front ends.

mod transcript;

pub use transcript::{Speaker, Transcript, TranscriptEntry};
