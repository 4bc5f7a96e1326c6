//! Rule - One (predicate, reply, next context) triple
//!
//! `RuleDef` is the serializable form found in rule files; `Rule` is the
//! compiled form the responder evaluates.

use serde::{Deserialize, Serialize};

use crate::context::ContextTag;
use crate::error::RuleError;
use crate::keyword::{KeywordEntry, KeywordSet, MatchType};

/// A keyword as written in a rule file: either a bare string (which takes
/// the rule's default match type) or a full entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum KeywordSpec {
    Plain(String),
    Entry(KeywordEntry),
}

impl KeywordSpec {
    fn to_entry(&self, default_match: MatchType) -> KeywordEntry {
        match self {
            Self::Plain(pattern) => KeywordEntry {
                pattern: pattern.clone(),
                match_type: default_match,
                enabled: true,
            },
            Self::Entry(entry) => entry.clone(),
        }
    }
}

impl From<&str> for KeywordSpec {
    fn from(pattern: &str) -> Self {
        Self::Plain(pattern.to_string())
    }
}

/// Serializable rule definition
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RuleDef {
    /// Unique identifier, reported back with each response
    pub id: String,

    /// Context that must be current for this rule to apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_context: Option<ContextTag>,

    /// Match type used for plain-string keywords
    #[serde(default)]
    pub match_type: MatchType,

    /// Any-of keyword set
    pub keywords: Vec<KeywordSpec>,

    /// Canned reply text
    pub reply: String,

    /// Context to remember after this rule answers
    #[serde(default)]
    pub next_context: ContextTag,
}

impl RuleDef {
    /// A topic rule: matches on keywords alone.
    pub fn topic(
        id: impl Into<String>,
        keywords: &[&str],
        reply: impl Into<String>,
        next_context: ContextTag,
    ) -> Self {
        Self {
            id: id.into(),
            when_context: None,
            match_type: MatchType::Exact,
            keywords: keywords.iter().copied().map(KeywordSpec::from).collect(),
            reply: reply.into(),
            next_context,
        }
    }

    /// A follow-up rule: requires `context` to be current as well.
    pub fn follow_up(
        id: impl Into<String>,
        context: ContextTag,
        keywords: &[&str],
        reply: impl Into<String>,
        next_context: ContextTag,
    ) -> Self {
        Self {
            when_context: Some(context),
            ..Self::topic(id, keywords, reply, next_context)
        }
    }

    /// Switch plain keywords to the given match type.
    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    /// Turn the named plain keywords into whole-word entries; the rest keep
    /// the rule's match type.
    pub fn with_whole_words(mut self, words: &[&str]) -> Self {
        for spec in &mut self.keywords {
            if let KeywordSpec::Plain(pattern) = spec {
                if words.contains(&pattern.as_str()) {
                    *spec = KeywordSpec::Entry(KeywordEntry::word(pattern.clone()));
                }
            }
        }
        self
    }

    /// Expanded keyword entries with the default match type applied.
    pub fn entries(&self) -> Vec<KeywordEntry> {
        self.keywords
            .iter()
            .map(|spec| spec.to_entry(self.match_type))
            .collect()
    }
}

/// When a rule applies
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Keyword containment only
    Topic(KeywordSet),
    /// Current context equals `context` AND keyword containment
    FollowUp {
        context: ContextTag,
        keywords: KeywordSet,
    },
}

impl Predicate {
    /// Evaluate against a case-folded utterance and the current context.
    pub fn matches(&self, folded: &str, current: ContextTag) -> bool {
        match self {
            Self::Topic(keywords) => keywords.matches(folded),
            Self::FollowUp { context, keywords } => {
                *context == current && keywords.matches(folded)
            }
        }
    }

    pub fn is_follow_up(&self) -> bool {
        matches!(self, Self::FollowUp { .. })
    }
}

/// Compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    def: RuleDef,
    predicate: Predicate,
}

impl Rule {
    /// Compile a definition, attributing any error to the rule id.
    pub fn compile(def: RuleDef) -> Result<Self, RuleError> {
        if def.reply.trim().is_empty() {
            return Err(RuleError::in_rule(&def.id, RuleError::EmptyReply));
        }
        let keywords =
            KeywordSet::compile(&def.entries()).map_err(|e| RuleError::in_rule(&def.id, e))?;
        let predicate = match def.when_context {
            Some(context) => Predicate::FollowUp { context, keywords },
            None => Predicate::Topic(keywords),
        };
        Ok(Self { def, predicate })
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn reply(&self) -> &str {
        &self.def.reply
    }

    pub fn next_context(&self) -> ContextTag {
        self.def.next_context
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn def(&self) -> &RuleDef {
        &self.def
    }

    pub fn matches(&self, folded: &str, current: ContextTag) -> bool {
        self.predicate.matches(folded, current)
    }
}
