//! Handles a single user submission within a session.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::{
    base::types::{ConversationTurn, Void},
    runtime::Runtime,
};

use super::conversation::Session;

/// Handles one user message: records it, replies, and escalates crises.
///
/// Blank submissions are ignored and leave the transcript untouched.
#[instrument(skip_all)]
pub async fn handle_chat_event(text: &str, session: &mut Session, runtime: &Runtime) -> Void {
    let text = text.trim();

    if text.is_empty() {
        debug!("Ignoring blank submission.");
        return Ok(());
    }

    let config = &runtime.config;
    let chat = &runtime.chat;

    // Record the user's turn.

    session.conversation.push(ConversationTurn::user(text));

    // Simulate the assistant composing a reply.

    chat.show_typing(&config.assistant_name).await?;

    if config.typing_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.typing_delay_ms)).await;
    }

    // Classify and reply.

    let response = runtime.triage.respond(text, &mut session.rng);
    let turn = ConversationTurn::system(&response);

    session.conversation.push(turn.clone());
    chat.send_turn(&config.assistant_name, &turn).await?;

    // Escalate.

    if response.is_crisis {
        warn!("Crisis language detected; showing {} escalation resources.", config.crisis_resources.len());

        chat.show_crisis_resources(&config.crisis_resources).await?;
    }

    Ok(())
}
