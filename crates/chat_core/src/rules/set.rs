//! RuleSet - Ordered rules plus the fallback reply
//!
//! Rule sets can be built in code or loaded from TOML / JSON files:
//!
//! ```toml
//! fallback = "Ask me about projects or skills!"
//!
//! [[rules]]
//! id = "skills_more"
//! when_context = "skills"
//! keywords = ["more", "detail"]
//! reply = "I also work with STM32 boards."
//! next_context = "skills"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::rule::{Rule, RuleDef};
use crate::context::ContextTag;
use crate::error::RuleError;

/// Serializable rule set
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RuleSetDef {
    /// Reply used when no rule matches
    pub fallback: String,

    /// Rules in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// Compiled, validated rule set
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    fallback: String,
}

impl RuleSet {
    /// Compile and validate a definition.
    pub fn compile(def: RuleSetDef) -> Result<Self, RuleError> {
        if def.fallback.trim().is_empty() {
            return Err(RuleError::EmptyFallback);
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(def.rules.len());
        for rule_def in def.rules {
            if !seen.insert(rule_def.id.clone()) {
                return Err(RuleError::DuplicateId(rule_def.id));
            }
            rules.push(Rule::compile(rule_def)?);
        }

        log::debug!("Compiled rule set with {} rules", rules.len());
        Ok(Self {
            rules,
            fallback: def.fallback,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RuleError> {
        let def: RuleSetDef = toml::from_str(content)?;
        Self::compile(def)
    }

    pub fn from_json_str(content: &str) -> Result<Self, RuleError> {
        let def: RuleSetDef = serde_json::from_str(content)?;
        Self::compile(def)
    }

    /// Load a rule file, picking the format from the extension.
    pub fn from_path(path: &Path) -> Result<Self, RuleError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let content = std::fs::read_to_string(path)?;
        let rules = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => return Err(RuleError::UnsupportedFormat(path.to_path_buf())),
        };
        log::info!("Loaded {} rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// First rule matching the case-folded utterance in the given context.
    pub fn first_match(&self, folded: &str, context: ContextTag) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(folded, context))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Back to the serializable form.
    pub fn to_def(&self) -> RuleSetDef {
        RuleSetDef {
            fallback: self.fallback.clone(),
            rules: self.rules.iter().map(|rule| rule.def().clone()).collect(),
        }
    }
}
