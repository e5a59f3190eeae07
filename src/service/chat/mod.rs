pub mod terminal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ConversationTurn, CrisisResource, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the surface a user talks to the assistant through.
/// Implementing this trait allows different front ends (a terminal, a test
/// harness) to drive the same conversation logic.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Read the next user message.
    ///
    /// Returns `None` when the user ends the session.
    async fn read_message(&self) -> Res<Option<String>>;

    /// Signal that the assistant is composing a reply.
    async fn show_typing(&self, assistant_name: &str) -> Void;

    /// Render one conversation turn.
    async fn send_turn(&self, assistant_name: &str, turn: &ConversationTurn) -> Void;

    /// Render escalation resources after a crisis reply.
    ///
    /// Each resource carries a phone number the user can call right away.
    async fn show_crisis_resources(&self, resources: &[CrisisResource]) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
