//! Core components, types, and utilities for care-triage.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The topic rule table and its validation.
//! - Common types and result handling.

pub mod config;
pub mod rules;
pub mod types;
