//! ContextTag - Topic memory carried between turns
//!
//! The tag records what the last reply was about so that short follow-ups
//! ("more", "which one?") can be answered in context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The topic discussed on the previous turn.
///
/// `None` means no topic is remembered (fresh session or after the fallback).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContextTag {
    /// Nothing remembered.
    #[default]
    None,
    /// The visitor greeted the bot or asked who Rima is.
    Intro,
    /// Skills and tech stack.
    Skills,
    /// The project gallery in general.
    Projects,
    /// The PitStop project specifically.
    PitstopDeep,
    /// Getting in touch / hiring.
    Contact,
    /// Fun facts and hobbies.
    Fun,
}

impl ContextTag {
    /// All tags, in declaration order.
    pub const ALL: [ContextTag; 7] = [
        ContextTag::None,
        ContextTag::Intro,
        ContextTag::Skills,
        ContextTag::Projects,
        ContextTag::PitstopDeep,
        ContextTag::Contact,
        ContextTag::Fun,
    ];

    /// The snake_case name used in rule files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Intro => "intro",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::PitstopDeep => "pitstop_deep",
            Self::Contact => "contact",
            Self::Fun => "fun",
        }
    }

    /// Whether a topic is remembered.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown tag name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown context tag '{0}'")]
pub struct UnknownContextTag(pub String);

impl FromStr for ContextTag {
    type Err = UnknownContextTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ContextTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == needle)
            .ok_or_else(|| UnknownContextTag(s.to_string()))
    }
}
