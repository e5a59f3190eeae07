//! Service integrations used by care-triage.
//!
//! This module contains implementations for the services a session relies on:
//! - Chat surfaces (e.g., the terminal)
//! - Triage engines (e.g., keyword matching)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod triage;
