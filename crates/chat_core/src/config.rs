use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RuleError};
use crate::paths::{config_json_path, LOCAL_CONFIG_FILE};
use crate::rules::{builtin, RuleSet};

pub const ENV_TYPING_DELAY_MS: &str = "PORTFOLIO_CHAT_TYPING_DELAY_MS";
pub const ENV_RULES: &str = "PORTFOLIO_CHAT_RULES";
pub const ENV_BOT_NAME: &str = "PORTFOLIO_CHAT_BOT_NAME";

const DEFAULT_TYPING_DELAY_MS: u64 = 800;

/// A button that submits a fixed utterance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickReply {
    pub label: String,
    pub utterance: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            utterance: utterance.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetConfig {
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Shown when the widget opens; not part of the transcript
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Artificial delay before a reply shows up
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    #[serde(default = "default_quick_replies")]
    pub quick_replies: Vec<QuickReply>,
    /// TOML or JSON rule file replacing the built-in rules
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

fn default_bot_name() -> String {
    "RimaBot".to_string()
}

fn default_welcome_message() -> String {
    "Hi! I'm RimaBot 👋 Want to know about Rima's projects, skills, or get in touch? Just ask!"
        .to_string()
}

fn default_typing_delay_ms() -> u64 {
    DEFAULT_TYPING_DELAY_MS
}

fn default_quick_replies() -> Vec<QuickReply> {
    vec![
        QuickReply::new("Projects", "Tell me about your projects"),
        QuickReply::new("PitStop", "Tell me about PitStop"),
        QuickReply::new("Skills", "What are your skills?"),
        QuickReply::new("Contact", "How can I contact you?"),
    ]
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            welcome_message: default_welcome_message(),
            typing_delay_ms: default_typing_delay_ms(),
            quick_replies: default_quick_replies(),
            rules_path: None,
        }
    }
}

impl WidgetConfig {
    /// Load the effective config: ~/.portfolio-chat/config.json, else
    /// ./portfolio-chat.toml, else defaults; then environment overrides.
    pub fn new() -> Self {
        let mut config = None;

        let json_path = config_json_path();
        if json_path.exists() {
            match Self::from_path(&json_path) {
                Ok(file_config) => config = Some(file_config),
                Err(e) => log::warn!("Ignoring {}: {}", json_path.display(), e),
            }
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if config.is_none() && local.exists() {
            match Self::from_path(local) {
                Ok(file_config) => config = Some(file_config),
                Err(e) => log::warn!("Ignoring {}: {}", local.display(), e),
            }
        }

        let mut config = config.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file; `.json` is parsed as JSON, anything else as TOML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str::<Self>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<Self>(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Apply environment overrides. Invalid values are logged and skipped.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TYPING_DELAY_MS) {
            match parse_delay_ms(ENV_TYPING_DELAY_MS, &value) {
                Ok(ms) => self.typing_delay_ms = ms,
                Err(e) => log::warn!("{}", e),
            }
        }
        if let Some(value) = lookup(ENV_RULES) {
            if !value.trim().is_empty() {
                self.rules_path = Some(PathBuf::from(value.trim()));
            }
        }
        if let Some(value) = lookup(ENV_BOT_NAME) {
            if !value.trim().is_empty() {
                self.bot_name = value.trim().to_string();
            }
        }
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    /// The rule set to answer with: the configured file, or the built-in rules.
    pub fn load_rules(&self) -> Result<Arc<RuleSet>, RuleError> {
        match &self.rules_path {
            Some(path) => RuleSet::from_path(path).map(Arc::new),
            None => Ok(builtin::shared()),
        }
    }
}

fn parse_delay_ms(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
        })
}
