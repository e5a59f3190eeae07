use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Topic id reported when no rule matches.
pub const GENERAL_TOPIC_ID: &str = "general";

/// The outcome of classifying one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResponse {
    pub topic_id: String,
    pub response_text: String,
    pub is_crisis: bool,
}

/// An escalation resource shown next to every crisis reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisResource {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub description: String,
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
}

/// One message in a transcript.
///
/// Fields are private so a turn cannot change after it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    speaker: Speaker,
    text: String,
    timestamp: DateTime<Utc>,
    is_crisis: bool,
    topic_id: Option<String>,
}

impl ConversationTurn {
    /// A turn submitted by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            timestamp: Utc::now(),
            is_crisis: false,
            topic_id: None,
        }
    }

    /// A system reply produced by the triage engine.
    pub fn system(response: &TriageResponse) -> Self {
        Self {
            speaker: Speaker::System,
            text: response.response_text.clone(),
            timestamp: Utc::now(),
            is_crisis: response.is_crisis,
            topic_id: Some(response.topic_id.clone()),
        }
    }

    /// A system turn that opens a session.
    pub fn greeting(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
            timestamp: Utc::now(),
            is_crisis: false,
            topic_id: None,
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_crisis(&self) -> bool {
        self.is_crisis
    }

    /// The classified topic, for system replies.
    pub fn topic_id(&self) -> Option<&str> {
        self.topic_id.as_deref()
    }
}

// Tests.
