//! In-memory conversation transcript and per-session state.

use std::collections::{BTreeMap, VecDeque};

use rand::{SeedableRng, rngs::StdRng};

use crate::base::{
    config::Config,
    types::{ConversationTurn, GENERAL_TOPIC_ID, Speaker},
};

/// An append-only transcript plus a short memory of recent topics.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    recent_topics: VecDeque<String>,
    recent_topic_limit: usize,
}

impl Conversation {
    pub fn new(recent_topic_limit: usize) -> Self {
        Self {
            turns: Vec::new(),
            recent_topics: VecDeque::new(),
            recent_topic_limit: recent_topic_limit.max(1),
        }
    }

    /// Append a turn.
    ///
    /// System turns with a specific topic are also remembered as recent topics.
    pub fn push(&mut self, turn: ConversationTurn) {
        if turn.speaker() == Speaker::System
            && let Some(topic) = turn.topic_id()
            && topic != GENERAL_TOPIC_ID
        {
            if self.recent_topics.len() == self.recent_topic_limit {
                self.recent_topics.pop_front();
            }
            self.recent_topics.push_back(topic.to_string());
        }

        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Recent topics, oldest first.
    pub fn recent_topics(&self) -> impl Iterator<Item = &str> {
        self.recent_topics.iter().map(String::as_str)
    }

    /// Whether any reply in this conversation was a crisis reply.
    pub fn crisis_flagged(&self) -> bool {
        self.turns.iter().any(ConversationTurn::is_crisis)
    }

    /// Number of system replies per topic.
    pub fn topic_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();

        for topic in self.turns.iter().filter_map(ConversationTurn::topic_id) {
            *counts.entry(topic.to_string()).or_insert(0) += 1;
        }

        counts
    }
}

/// State owned by one interactive session.
pub struct Session {
    pub conversation: Conversation,
    pub rng: StdRng,
}

impl Session {
    /// Create a session, seeding the response generator from `rng_seed` when set.
    pub fn new(config: &Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            conversation: Conversation::new(config.recent_topic_limit),
            rng,
        }
    }
}

// Tests.
