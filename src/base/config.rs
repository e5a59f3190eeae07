//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::PathBuf, sync::Arc};

use serde::Deserialize;

use crate::service::triage::MatchMode;

use super::types::{CrisisResource, Res};

/// Default display name for system turns.
fn default_assistant_name() -> String {
    "Sahara".to_string()
}

/// Default opening message for a session.
fn default_greeting() -> String {
    "Hi, I'm here to listen. How are you feeling today? You can type /quit at any time to leave.".to_string()
}

/// Default supportive replies for input that matches no topic.
fn default_fallback_responses() -> Vec<String> {
    vec![
        "Thank you for sharing that with me. Could you tell me a bit more about how you're feeling?".to_string(),
        "I'm here to listen. What's been on your mind lately?".to_string(),
        "That sounds important. How has it been affecting you day to day?".to_string(),
    ]
}

/// Default simulated typing delay, in milliseconds.
fn default_typing_delay_ms() -> u64 {
    1200
}

/// Default number of recent topics a session remembers.
fn default_recent_topic_limit() -> usize {
    5
}

/// Default escalation resources.
fn default_crisis_resources() -> Vec<CrisisResource> {
    vec![
        CrisisResource {
            name: "Tele-MANAS".to_string(),
            phone: "14416".to_string(),
            description: "24x7 national mental health helpline".to_string(),
        },
        CrisisResource {
            name: "Emergency services".to_string(),
            phone: "112".to_string(),
            description: "If you are in immediate danger".to_string(),
        },
    ]
}

/// Configuration for the care-triage application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { inner: Arc::new(ConfigInner::default()) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Display name used for system turns (`ASSISTANT_NAME`).
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    /// Opening message of an interactive session (`GREETING`).
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Optional TOML rule file replacing the built-in rule table (`RULES_PATH`).
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    /// Keyword matching strategy (`MATCH_MODE`): `substring` or `word_boundary`.
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Replies used when no topic rule matches.
    #[serde(default = "default_fallback_responses")]
    pub fallback_responses: Vec<String>,
    /// Simulated typing delay before each reply, in milliseconds (`TYPING_DELAY_MS`).
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    /// Seed for response selection, for reproducible sessions (`RNG_SEED`).
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Number of recent topics a session remembers (`RECENT_TOPIC_LIMIT`).
    #[serde(default = "default_recent_topic_limit")]
    pub recent_topic_limit: usize,
    /// Resources rendered alongside every crisis reply.
    #[serde(default = "default_crisis_resources")]
    pub crisis_resources: Vec<CrisisResource>,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            greeting: default_greeting(),
            rules_path: None,
            match_mode: MatchMode::default(),
            fallback_responses: default_fallback_responses(),
            typing_delay_ms: default_typing_delay_ms(),
            rng_seed: None,
            recent_topic_limit: default_recent_topic_limit(),
            crisis_resources: default_crisis_resources(),
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("CARE_TRIAGE"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the invariants `load` enforces.
    pub fn validate(&self) -> Res<()> {
        if self.fallback_responses.is_empty() || self.fallback_responses.iter().any(|r| r.trim().is_empty()) {
            return Err(anyhow::anyhow!("Fallback responses must be non-empty and contain no blank entries."));
        }

        if self.typing_delay_ms > 10_000 {
            return Err(anyhow::anyhow!("Typing delay must be at most 10000 milliseconds."));
        }

        if self.recent_topic_limit < 1 || self.recent_topic_limit > 100 {
            return Err(anyhow::anyhow!("Recent topic limit must be between 1 and 100."));
        }

        if self.crisis_resources.is_empty() {
            return Err(anyhow::anyhow!("At least one crisis resource is required."));
        }

        if let Some(resource) = self.crisis_resources.iter().find(|r| !is_dialable(&r.phone)) {
            return Err(anyhow::anyhow!(
                "Crisis resource `{}` must have a phone number, got `{}`.",
                resource.name,
                resource.phone
            ));
        }

        Ok(())
    }
}

/// A phone entry is dialable when it has digits and only phone punctuation around them.
fn is_dialable(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone.chars().all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

// Tests.
