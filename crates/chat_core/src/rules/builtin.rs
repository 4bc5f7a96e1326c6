//! Built-in RimaBot rules
//!
//! Order matters: context follow-ups come first so that "more" after a topic
//! is not re-answered as a first question, then greetings, then topics.
//! Follow-up keywords are substrings ("detailed" counts as "detail"), except
//! short question words, which match whole words ("how" must not fire on "show").

use std::sync::{Arc, OnceLock};

use super::rule::RuleDef;
use super::set::{RuleSet, RuleSetDef};
use crate::context::ContextTag;
use crate::keyword::MatchType;

/// Follow-up keywords that only count as whole words.
const QUESTION_WORDS: &[&str] = &["how", "who", "which", "where"];

pub const FALLBACK_REPLY: &str = "I'm Rima's AI assistant! Ask me about her projects, skills, or how to get in touch. I'm here to help you navigate!";

pub const GREETING_REPLY: &str = "Hi there! I'm RimaBot 👋 I can tell you about Rima's projects, her skills, or how to reach her. Where should we start?";

pub const SKILLS_REPLY: &str = "I specialize in Python, PyTorch, LLMs, and MLOps. I also love working with embedded systems (STM32, Raspberry Pi). Check the Skills section to see everything!";

pub const SKILLS_FOLLOW_UP_REPLY: &str = "Digging deeper: on the AI side that means LangChain, RAG pipelines, vector DBs and the GPT APIs; on the ops side Docker, FastAPI and CI/CD. Ask about certifications or a project that used them!";

pub const PROJECTS_REPLY: &str = "I've built some cool stuff! Check out PitStop for automotive AI, CineRAG for movie recommendations, and my Brain Tumor Detection pipeline. Which interests you?";

pub const PROJECTS_FOLLOW_UP_REPLY: &str = "If I had to pick one, it's PitStop: a multilingual assistant that turns vehicle diagnostic codes into clear reports in French, English and Arabic. Say \"more\" for the deep dive!";

pub const PITSTOP_REPLY: &str = "PitStop is my multilingual AI assistant that translates vehicle diagnostic codes. Want to see a demo? Click on the PitStop project card!";

pub const PITSTOP_DEEP_DIVE_REPLY: &str = "Under the hood PitStop pairs the GPT API with rule-based augmentation, served through FastAPI in Docker. It cut diagnostic time by 60% with a 95.9% F1 score. Curious about the other projects?";

pub const CINERAG_REPLY: &str = "CineRAG is a RAG-based film recommender built with LangChain and a vector database: 92% accuracy and 4.7/5 user satisfaction. Want to hear about the others?";

pub const CONTACT_REPLY: &str = "I'm always open to interesting opportunities! Scroll to the contact section or email me at rimaalaya76@gmail.com. Let's build something amazing together!";

pub const CONTACT_FOLLOW_UP_REPLY: &str = "The quickest way is email: rimaalaya76@gmail.com. You can also use the contact form at the bottom of the page or find me on LinkedIn and GitHub.";

pub const EXPERIENCE_REPLY: &str = "Rima is an engineer from ENICarthage who interned in microservices and DevOps CI/CD at UPTECH, then built PitStop as her final-year project at XELERO. The Journey section has the full timeline!";

pub const ABOUT_REPLY: &str = "Rima turns complex AI challenges into elegant, reliable solutions, from LLM assistants to embedded boards. Ask about her experience, projects or skills!";

pub const FUN_REPLY: &str = "Fun fact: Rima enjoys tinkering with Raspberry Pi and STM32 boards as much as training models. Want another one?";

pub const FUN_FOLLOW_UP_REPLY: &str = "Another one: this chat widget is completely scripted, no model behind it. Rima likes knowing exactly what her bots will say!";

pub const THANKS_REPLY: &str = "You're welcome! Come back any time.";

/// The rule definitions, in evaluation order.
pub fn portfolio_rules() -> RuleSetDef {
    use ContextTag as C;

    let rules = vec![
        // Context follow-ups
        RuleDef::follow_up(
            "skills_follow_up",
            C::Skills,
            &["more", "detail", "else", "which"],
            SKILLS_FOLLOW_UP_REPLY,
            C::Skills,
        )
        .with_whole_words(QUESTION_WORDS),
        RuleDef::follow_up(
            "projects_follow_up",
            C::Projects,
            &["more", "which", "best"],
            PROJECTS_FOLLOW_UP_REPLY,
            C::PitstopDeep,
        )
        .with_whole_words(QUESTION_WORDS),
        RuleDef::follow_up(
            "pitstop_follow_up",
            C::PitstopDeep,
            &["more", "detail", "else", "how"],
            PITSTOP_DEEP_DIVE_REPLY,
            C::Projects,
        )
        .with_whole_words(QUESTION_WORDS),
        RuleDef::follow_up(
            "contact_follow_up",
            C::Contact,
            &["how", "email", "where", "linkedin"],
            CONTACT_FOLLOW_UP_REPLY,
            C::Contact,
        )
        .with_whole_words(QUESTION_WORDS),
        RuleDef::follow_up(
            "fun_follow_up",
            C::Fun,
            &["more", "another", "again"],
            FUN_FOLLOW_UP_REPLY,
            C::Fun,
        )
        .with_whole_words(QUESTION_WORDS),
        RuleDef::follow_up(
            "intro_follow_up",
            C::Intro,
            &["more", "who"],
            ABOUT_REPLY,
            C::Intro,
        )
        .with_whole_words(QUESTION_WORDS),
        // Greeting
        RuleDef::topic(
            "greeting",
            &["hello", "hi", "hey", "hola"],
            GREETING_REPLY,
            C::Intro,
        )
        .with_match_type(MatchType::Word),
        // Topics
        RuleDef::topic("pitstop", &["pitstop", "pit stop"], PITSTOP_REPLY, C::PitstopDeep),
        RuleDef::topic("cinerag", &["cinerag", "movie", "film"], CINERAG_REPLY, C::Projects),
        RuleDef::topic(
            "projects",
            &["project", "portfolio", "built"],
            PROJECTS_REPLY,
            C::Projects,
        ),
        RuleDef::topic(
            "contact",
            &["contact", "hire", "email", "reach", "touch"],
            CONTACT_REPLY,
            C::Contact,
        ),
        RuleDef::topic(
            "skills",
            &["skill", "stack", "tech", "certif"],
            SKILLS_REPLY,
            C::Skills,
        ),
        RuleDef::topic(
            "experience",
            &["experience", "intern", "background", "education"],
            EXPERIENCE_REPLY,
            C::Intro,
        ),
        RuleDef::topic(
            "fun",
            &["fun", "hobby", "hobbies", "joke", "jokes"],
            FUN_REPLY,
            C::Fun,
        )
        .with_match_type(MatchType::Word),
        RuleDef::topic("thanks", &["thank", "bye"], THANKS_REPLY, C::None),
    ];

    RuleSetDef {
        fallback: FALLBACK_REPLY.to_string(),
        rules,
    }
}

static PORTFOLIO: OnceLock<Arc<RuleSet>> = OnceLock::new();

/// The compiled built-in rule set, shared by every default responder.
pub fn shared() -> Arc<RuleSet> {
    Arc::clone(compiled())
}

/// The compiled built-in rule set.
pub fn portfolio() -> &'static RuleSet {
    compiled()
}

fn compiled() -> &'static Arc<RuleSet> {
    PORTFOLIO.get_or_init(|| {
        Arc::new(RuleSet::compile(portfolio_rules()).expect("built-in portfolio rules are valid"))
    })
}
