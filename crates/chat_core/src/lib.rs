//! chat_core - Core types and logic for the portfolio chat widget
//!
//! This crate provides the pieces the widget and its front ends share:
//! - `context` - ContextTag, the one-level topic memory
//! - `keyword` - keyword matching (substring, whole word, regex)
//! - `rules` - Rule / RuleSet and the built-in RimaBot rules
//! - `responder` - the stateless first-match-wins responder
//! - `message` - Transcript types
//! - `config` - WidgetConfig loading

pub mod config;
pub mod context;
pub mod error;
pub mod keyword;
pub mod message;
pub mod paths;
pub mod responder;
pub mod rules;

// Re-export commonly used types
pub use config::{QuickReply, WidgetConfig};
pub use context::{ContextTag, UnknownContextTag};
pub use error::{ConfigError, RuleError};
pub use keyword::{KeywordEntry, MatchType};
pub use message::{Speaker, Transcript, TranscriptEntry};
pub use responder::{respond, Responder, Response};
pub use rules::{Rule, RuleDef, RuleSet, RuleSetDef};
