//! Rules module - Ordered keyword rules for the dialogue responder

pub mod builtin;
mod rule;
mod set;

pub use rule::{KeywordSpec, Predicate, Rule, RuleDef};
pub use set::{RuleSet, RuleSetDef};
