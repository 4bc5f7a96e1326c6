//! Responder - Maps an utterance plus the current context to a canned reply
//!
//! The responder holds no conversation state. Callers pass the current
//! [`ContextTag`] in and store the returned one for the next turn.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::ContextTag;
use crate::rules::{builtin, RuleSet};

/// Result of one responder call
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// Reply text to show
    pub reply: String,
    /// Context to remember for the next turn
    pub next_context: ContextTag,
    /// Id of the matching rule; `None` when the fallback answered
    pub rule_id: Option<String>,
}

impl Response {
    pub fn is_fallback(&self) -> bool {
        self.rule_id.is_none()
    }
}

/// First-match-wins evaluator over a shared rule set
#[derive(Debug, Clone)]
pub struct Responder {
    rules: Arc<RuleSet>,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(builtin::shared())
    }
}

impl Responder {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Answer one utterance.
    ///
    /// Never fails: anything unmatched gets the fallback reply and clears the
    /// context.
    pub fn respond(&self, utterance: &str, context: ContextTag) -> Response {
        evaluate(&self.rules, utterance, context)
    }
}

/// Answer with the built-in portfolio rules.
pub fn respond(utterance: &str, context: ContextTag) -> Response {
    evaluate(builtin::portfolio(), utterance, context)
}

fn evaluate(rules: &RuleSet, utterance: &str, context: ContextTag) -> Response {
    let folded = utterance.to_lowercase();

    match rules.first_match(&folded, context) {
        Some(rule) => {
            log::debug!(
                "Rule '{}' matched in context {} -> {}",
                rule.id(),
                context,
                rule.next_context()
            );
            Response {
                reply: rule.reply().to_string(),
                next_context: rule.next_context(),
                rule_id: Some(rule.id().to_string()),
            }
        }
        None => {
            log::debug!("No rule matched in context {}, using fallback", context);
            Response {
                reply: rules.fallback().to_string(),
                next_context: ContextTag::None,
                rule_id: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::*;

    #[test]
    fn test_greeting_sets_intro() {
        for greeting in ["hello", "Hi!", "HEY there", "hola amigo"] {
            let response = respond(greeting, ContextTag::None);
            assert_eq!(response.reply, GREETING_REPLY, "greeting {greeting:?}");
            assert_eq!(response.next_context, ContextTag::Intro);
            assert_eq!(response.rule_id.as_deref(), Some("greeting"));
        }
    }

    #[test]
    fn test_greeting_precedes_topics() {
        let response = respond("Hi, what are your skills?", ContextTag::None);
        assert_eq!(response.reply, GREETING_REPLY);
    }

    #[test]
    fn test_skills_follow_up_differs_from_general_reply() {
        let general = respond("What tech do you use?", ContextTag::None);
        assert_eq!(general.reply, SKILLS_REPLY);
        assert_eq!(general.next_context, ContextTag::Skills);

        let follow_up = respond("tell me more", ContextTag::Skills);
        assert_eq!(follow_up.reply, SKILLS_FOLLOW_UP_REPLY);
        assert_ne!(follow_up.reply, general.reply);
        assert_eq!(follow_up.next_context, ContextTag::Skills);
    }

    #[test]
    fn test_skills_follow_up_self_loop() {
        let first = respond("more", ContextTag::Skills);
        let second = respond("more please", first.next_context);
        assert_eq!(second.reply, SKILLS_FOLLOW_UP_REPLY);
        assert_eq!(second.next_context, ContextTag::Skills);
    }

    #[test]
    fn test_more_without_context_falls_back() {
        let response = respond("more", ContextTag::None);
        assert_eq!(response.reply, FALLBACK_REPLY);
        assert_eq!(response.next_context, ContextTag::None);
        assert!(response.is_fallback());
    }

    #[test]
    fn test_unmatched_resets_context() {
        for context in ContextTag::ALL {
            let response = respond("what's the weather like?", context);
            assert_eq!(response.reply, FALLBACK_REPLY);
            assert_eq!(response.next_context, ContextTag::None);
        }
    }

    #[test]
    fn test_same_words_depend_on_context() {
        assert_eq!(respond("which one?", ContextTag::Projects).reply, PROJECTS_FOLLOW_UP_REPLY);
        assert_eq!(respond("which one?", ContextTag::Skills).reply, SKILLS_FOLLOW_UP_REPLY);
        assert_eq!(respond("which one?", ContextTag::None).reply, FALLBACK_REPLY);
    }

    #[test]
    fn test_which_is_not_a_greeting() {
        let response = respond("which", ContextTag::None);
        assert!(response.is_fallback());
    }

    #[test]
    fn test_topic_switch_from_follow_up_context() {
        let response = respond("how can I hire Rima?", ContextTag::Skills);
        assert_eq!(response.reply, CONTACT_REPLY);
        assert_eq!(response.next_context, ContextTag::Contact);
    }

    #[test]
    fn test_default_responders_share_builtin_rules() {
        let a = Responder::default();
        let b = Responder::default();
        assert!(Arc::ptr_eq(&a.rules, &b.rules));
        assert_eq!(a.rules().len(), portfolio().len());
    }

    #[test]
    fn test_responder_with_custom_rules() {
        let rules = RuleSet::from_toml_str(
            r#"
fallback = "Nope."

[[rules]]
id = "ping"
keywords = ["ping"]
reply = "pong"
next_context = "fun"
"#,
        )
        .unwrap();
        let responder = Responder::new(Arc::new(rules));
        let response = responder.respond("PING", ContextTag::None);
        assert_eq!(response.reply, "pong");
        assert_eq!(response.next_context, ContextTag::Fun);
        assert_eq!(responder.respond("hello", ContextTag::Fun).reply, "Nope.");
    }
}
