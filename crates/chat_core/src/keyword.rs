use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// How a keyword is tested against an utterance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Substring containment
    #[default]
    Exact,
    /// Whole-word containment ("hi" does not match "which")
    Word,
    /// Regex pattern match
    Regex,
}

/// A single keyword entry as written in a rule file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordEntry {
    /// The pattern to match (plain text for exact/word, regex pattern for regex)
    pub pattern: String,
    /// Type of matching
    #[serde(default)]
    pub match_type: MatchType,
    /// Whether this entry is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl KeywordEntry {
    /// Create a new substring keyword entry
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: MatchType::Exact,
            enabled: true,
        }
    }

    /// Create a new whole-word keyword entry
    pub fn word(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: MatchType::Word,
            enabled: true,
        }
    }

    /// Create a new regex keyword entry
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: MatchType::Regex,
            enabled: true,
        }
    }

    /// Compile the entry into a matcher.
    ///
    /// Patterns are case-folded here so matching only has to fold the utterance.
    pub fn compile(&self) -> Result<Keyword, RuleError> {
        let folded = self.pattern.trim().to_lowercase();
        if folded.is_empty() {
            return Err(RuleError::EmptyPattern);
        }
        match self.match_type {
            MatchType::Exact => Ok(Keyword::Substring(folded)),
            MatchType::Word => {
                let source = format!(r"\b{}\b", regex::escape(&folded));
                build_regex(&source).map(Keyword::Pattern)
            }
            MatchType::Regex => build_regex(&self.pattern).map(Keyword::Pattern),
        }
    }
}

fn build_regex(source: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })
}

/// A compiled keyword
#[derive(Debug, Clone)]
pub enum Keyword {
    Substring(String),
    Pattern(Regex),
}

impl Keyword {
    /// Test an already case-folded utterance
    pub fn is_match(&self, folded: &str) -> bool {
        match self {
            Keyword::Substring(needle) => folded.contains(needle.as_str()),
            Keyword::Pattern(regex) => regex.is_match(folded),
        }
    }
}

/// An any-of set of compiled keywords
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    /// Compile the enabled entries. Disabled entries are skipped; a set with
    /// nothing enabled is rejected since it could never match.
    pub fn compile(entries: &[KeywordEntry]) -> Result<Self, RuleError> {
        let keywords = entries
            .iter()
            .filter(|entry| entry.enabled)
            .map(KeywordEntry::compile)
            .collect::<Result<Vec<_>, _>>()?;
        if keywords.is_empty() {
            return Err(RuleError::NoKeywords);
        }
        Ok(Self { keywords })
    }

    /// Whether any keyword occurs in the case-folded utterance
    pub fn matches(&self, folded: &str) -> bool {
        self.keywords.iter().any(|k| k.is_match(folded))
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
