pub mod keyword;

use std::{ops::Deref, sync::Arc};

use rand::{RngCore, seq::SliceRandom};
use serde::Deserialize;

use crate::base::{
    rules::TopicRule,
    types::{GENERAL_TOPIC_ID, TriageResponse},
};

// Types.

/// How rule keywords are compared against input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain containment: `"die"` matches inside `"diet"`.
    #[default]
    Substring,
    /// The keyword must start and end on word boundaries.
    WordBoundary,
}

/// Which rule, if any, an input was classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    Crisis(&'a TopicRule),
    Topic(&'a TopicRule),
    General,
}

impl Classification<'_> {
    pub fn topic_id(&self) -> &str {
        match self {
            Classification::Crisis(rule) | Classification::Topic(rule) => &rule.id,
            Classification::General => GENERAL_TOPIC_ID,
        }
    }

    pub fn is_crisis(&self) -> bool {
        matches!(self, Classification::Crisis(_))
    }
}

// Traits.

/// Generic triage engine trait that classifiers must implement.
///
/// Classification is deterministic for a given input; only the reply text
/// depends on the random source handed to `respond`.
pub trait GenericTriageEngine: Send + Sync + 'static {
    /// Classify `input` without picking a reply.
    fn classify(&self, input: &str) -> Classification<'_>;

    /// Classify `input` and pick a reply using `rng`.
    fn respond(&self, input: &str, rng: &mut dyn RngCore) -> TriageResponse;

    /// Classify `input` and pick a reply using the thread-local generator.
    fn classify_and_respond(&self, input: &str) -> TriageResponse {
        self.respond(input, &mut rand::thread_rng())
    }
}

// Structs.

/// Triage client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TriageClient {
    inner: Arc<dyn GenericTriageEngine>,
}

impl Deref for TriageClient {
    type Target = dyn GenericTriageEngine;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TriageClient {
    pub fn new(inner: Arc<dyn GenericTriageEngine>) -> Self {
        Self { inner }
    }
}

// Helpers.

/// Pick one of the rule's responses uniformly at random.
pub fn select_response<'a>(rule: &'a TopicRule, rng: &mut dyn RngCore) -> &'a str {
    pick(&rule.responses, rng)
}

/// Pick one entry of `candidates` uniformly at random; empty yields `""`.
pub(crate) fn pick<'a>(candidates: &'a [String], rng: &mut dyn RngCore) -> &'a str {
    candidates.choose(rng).map(String::as_str).unwrap_or_default()
}

// Tests.
