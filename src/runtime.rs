//! Runtime services and shared state for care-triage.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        rules::RuleSet,
        types::{ConversationTurn, CrisisResource, Res, TriageResponse, Void},
    },
    interaction::{chat_event::handle_chat_event, conversation::Session},
    service::{
        chat::{ChatClient, terminal::format_crisis_resources},
        triage::TriageClient,
    },
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the triage engine, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The triage engine instance.
    pub triage: TriageClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance backed by the terminal.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        let triage = build_triage(&config)?;
        let chat = ChatClient::terminal();

        Ok(Self { config, triage, chat })
    }

    /// Run an interactive session until the user leaves or Ctrl-C is pressed.
    pub async fn start(&self) -> Void {
        let mut session = Session::new(&self.config);

        // Open with a greeting.

        let greeting = ConversationTurn::greeting(self.config.greeting.clone());
        session.conversation.push(greeting.clone());
        self.chat.send_turn(&self.config.assistant_name, &greeting).await?;

        // Process messages until the session ends.

        loop {
            let message = tokio::select! {
                message = self.chat.read_message() => message?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C, ending session.");
                    None
                }
            };

            let Some(message) = message else {
                break;
            };

            handle_chat_event(&message, &mut session, self).await?;
        }

        // Summarize.

        let conversation = &session.conversation;
        info!("Session ended after {} turns; topics: {:?}.", conversation.turns().len(), conversation.topic_counts());

        if conversation.crisis_flagged() {
            warn!("This session included a crisis reply.");
        }

        Ok(())
    }
}

/// Build the triage engine from the configured rule file, or the built-in table.
#[instrument(skip_all)]
pub fn build_triage(config: &Config) -> Res<TriageClient> {
    let rules = match &config.rules_path {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::builtin()?,
    };

    info!("Using {} topic rules.", rules.rule_count());

    TriageClient::keyword(rules, config.match_mode, config.fallback_responses.clone())
}

/// Classify a single message with the configured rules.
pub fn respond_once(config: &Config, text: &str) -> Res<TriageResponse> {
    let triage = build_triage(config)?;

    let response = match config.rng_seed {
        Some(seed) => {
            use rand::SeedableRng;
            triage.respond(text, &mut rand::rngs::StdRng::seed_from_u64(seed))
        }
        None => triage.classify_and_respond(text),
    };

    Ok(response)
}

/// A one-shot reply together with the resources to surface for a crisis reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OneShotReply {
    #[serde(flatten)]
    pub response: TriageResponse,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub crisis_resources: Vec<CrisisResource>,
}

impl OneShotReply {
    /// Render as pretty JSON, or as plain text followed by any crisis resources.
    pub fn render(&self, json: bool) -> Res<String> {
        let mut out = if json {
            serde_json::to_string_pretty(self)?
        } else {
            self.response.response_text.clone()
        };
        out.push('\n');

        if !json && !self.crisis_resources.is_empty() {
            out.push_str(&format_crisis_resources(&self.crisis_resources));
        }

        Ok(out)
    }
}

/// Classify a single message and attach the configured resources when it escalates.
pub fn reply_once(config: &Config, text: &str) -> Res<OneShotReply> {
    let response = respond_once(config, text)?;

    let crisis_resources = if response.is_crisis {
        warn!("Crisis language detected; escalating with {} resources.", config.crisis_resources.len());
        config.crisis_resources.clone()
    } else {
        Vec::new()
    };

    Ok(OneShotReply { response, crisis_resources })
}

// Tests.
