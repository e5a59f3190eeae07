//! Keyword-matching triage engine.
//!
//! Input is lowercased and tested against the crisis rule first, then every
//! other rule in declaration order. The first rule with a matching keyword
//! wins; otherwise the input is classified as `general`.

use std::sync::Arc;

use anyhow::Context;
use rand::RngCore;
use regex::Regex;
use tracing::{debug, instrument, trace, warn};

use crate::base::{
    rules::{RuleSet, TopicRule},
    types::{Res, TriageResponse},
};

use super::{Classification, GenericTriageEngine, MatchMode, TriageClient, pick, select_response};

// Extra methods on `TriageClient` applied by the keyword implementation.

impl TriageClient {
    pub fn keyword(rules: RuleSet, mode: MatchMode, fallback_responses: Vec<String>) -> Res<Self> {
        let engine = KeywordTriageEngine::new(rules, mode, fallback_responses)?;
        Ok(Self::new(Arc::new(engine)))
    }
}

// Matchers.

/// A rule's keywords prepared for one match mode.
#[derive(Debug)]
enum KeywordMatcher {
    Substring(Vec<String>),
    WordBoundary(Regex),
}

impl KeywordMatcher {
    fn new(rule: &TopicRule, mode: MatchMode) -> Res<Self> {
        match mode {
            MatchMode::Substring => Ok(Self::Substring(rule.keywords.clone())),
            MatchMode::WordBoundary => {
                let alternatives = rule.keywords.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
                let regex = Regex::new(&format!(r"\b(?:{alternatives})\b")).with_context(|| format!("Failed to compile keywords for topic rule `{}`.", rule.id))?;

                Ok(Self::WordBoundary(regex))
            }
        }
    }

    /// `haystack` must already be lowercase.
    fn is_match(&self, haystack: &str) -> bool {
        match self {
            Self::Substring(keywords) => keywords.iter().any(|k| haystack.contains(k.as_str())),
            Self::WordBoundary(regex) => regex.is_match(haystack),
        }
    }
}

#[derive(Debug)]
struct CompiledRule {
    rule: TopicRule,
    matcher: KeywordMatcher,
}

impl CompiledRule {
    fn new(rule: TopicRule, mode: MatchMode) -> Res<Self> {
        let matcher = KeywordMatcher::new(&rule, mode)?;
        Ok(Self { rule, matcher })
    }
}

// Specific implementations.

/// Keyword triage engine implementation.
///
/// Holds no mutable state; concurrent calls need no synchronization.
#[derive(Debug)]
pub struct KeywordTriageEngine {
    crisis: CompiledRule,
    topics: Vec<CompiledRule>,
    fallback_responses: Vec<String>,
    mode: MatchMode,
}

impl KeywordTriageEngine {
    /// Create a new keyword triage engine.
    #[instrument(name = "KeywordTriageEngine::new", skip_all)]
    pub fn new(rules: RuleSet, mode: MatchMode, fallback_responses: Vec<String>) -> Res<Self> {
        if fallback_responses.is_empty() {
            return Err(anyhow::anyhow!("At least one fallback response is required."));
        }

        if mode == MatchMode::Substring {
            warn_on_overlapping_keywords(&rules);
        }

        let crisis = CompiledRule::new(rules.crisis().clone(), mode)?;
        let topics = rules.topics().iter().cloned().map(|r| CompiledRule::new(r, mode)).collect::<Res<Vec<_>>>()?;

        debug!("Triage engine ready with {} topic rules ({:?} matching).", topics.len() + 1, mode);

        Ok(Self {
            crisis,
            topics,
            fallback_responses,
            mode,
        })
    }

    pub fn match_mode(&self) -> MatchMode {
        self.mode
    }
}

impl GenericTriageEngine for KeywordTriageEngine {
    fn classify(&self, input: &str) -> Classification<'_> {
        if input.trim().is_empty() {
            return Classification::General;
        }

        let lowered = input.to_lowercase();
        trace!(input = %lowered, "Classifying input.");

        if self.crisis.matcher.is_match(&lowered) {
            return Classification::Crisis(&self.crisis.rule);
        }

        self.topics.iter().find(|t| t.matcher.is_match(&lowered)).map(|t| Classification::Topic(&t.rule)).unwrap_or(Classification::General)
    }

    fn respond(&self, input: &str, rng: &mut dyn RngCore) -> TriageResponse {
        let classification = self.classify(input);

        let response_text = match classification {
            Classification::Crisis(rule) | Classification::Topic(rule) => select_response(rule, rng),
            Classification::General => pick(&self.fallback_responses, rng),
        };

        debug!(topic = classification.topic_id(), is_crisis = classification.is_crisis(), "Classified input.");

        TriageResponse {
            topic_id: classification.topic_id().to_string(),
            response_text: response_text.to_string(),
            is_crisis: classification.is_crisis(),
        }
    }
}

/// Warn about keywords that contain another rule's keyword as a substring.
///
/// Such pairs are shadowed by declaration order under substring matching.
fn warn_on_overlapping_keywords(rules: &RuleSet) {
    let all = std::iter::once(rules.crisis()).chain(rules.topics()).collect::<Vec<_>>();

    for (i, earlier) in all.iter().enumerate() {
        for later in &all[i + 1..] {
            for outer in &later.keywords {
                if let Some(inner) = earlier.keywords.iter().find(|k| outer.contains(k.as_str())) {
                    warn!("Keyword `{outer}` of `{}` is shadowed by `{inner}` of `{}`.", later.id, earlier.id);
                }
            }
        }
    }
}

// Tests.
