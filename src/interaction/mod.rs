//! Event handling and user interactions for care-triage.
//!
//! This module provides functionality for handling chat sessions:
//! - Processing incoming user messages
//! - Keeping the in-memory transcript and recent topics
//! - Coordinating replies between services (triage, chat)

pub mod chat_event;
pub mod conversation;
