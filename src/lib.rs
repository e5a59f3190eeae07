//! Library root for `care-triage`.
//!
//! Care-triage is the conversational responder behind a student wellbeing chat, designed to:
//! - Classify a student's message into a topic of concern
//! - Detect crisis language before anything else and surface helplines
//! - Reply with a supportive, topic-appropriate message
//!
//! The responder is a pure keyword classifier over a static rule table; the
//! session layer around it keeps an in-memory transcript and talks to the
//! user through a chat surface. Each service sits behind a trait so it can
//! be swapped or mocked.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{
    config::Config,
    types::{Res, TriageResponse, Void},
};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts an interactive session:
/// - Builds the triage engine from the configured rule table
/// - Creates the runtime context with the terminal chat client
/// - Runs the session loop until the user leaves
pub async fn start(config: Config) -> Void {
    info!("Starting care-triage ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}

/// Classify a single message and return the reply payload.
pub fn respond_once(config: &Config, text: &str) -> Res<TriageResponse> {
    runtime::respond_once(config, text)
}

/// Classify a single message and attach crisis resources when it escalates.
pub fn reply_once(config: &Config, text: &str) -> Res<runtime::OneShotReply> {
    runtime::reply_once(config, text)
}
