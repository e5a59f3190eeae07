//! Topic rules and the built-in rule table.
//!
//! A rule names a category of student concern, the lowercase keywords that
//! trigger it, and the candidate replies to choose from. Exactly one rule is
//! the crisis rule; the engine always evaluates it first.

use std::{collections::HashSet, path::Path};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::types::{GENERAL_TOPIC_ID, Res};

/// A named category of user concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRule {
    /// Topic identifier (e.g., `anxiety`).
    pub id: String,
    /// Lowercase substrings that trigger this rule.
    pub keywords: Vec<String>,
    /// Candidate replies; one is picked at random per match.
    pub responses: Vec<String>,
    /// Whether a match must surface escalation resources.
    #[serde(default)]
    pub is_crisis: bool,
}

impl TopicRule {
    /// Build a rule from static string slices.
    pub fn new(id: &str, keywords: &[&str], responses: &[&str], is_crisis: bool) -> Self {
        Self {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            responses: responses.iter().map(|r| r.to_string()).collect(),
            is_crisis,
        }
    }
}

/// On-disk shape of a rule file.
///
/// ```toml
/// [[rules]]
/// id = "sleep"
/// keywords = ["sleep", "insomnia"]
/// responses = ["Sleep troubles are exhausting."]
/// ```
#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<TopicRule>,
}

/// A validated, read-only rule table.
///
/// The crisis rule is held apart from the topical rules, which keep their
/// declaration order.
#[derive(Debug, Clone)]
pub struct RuleSet {
    crisis: TopicRule,
    topics: Vec<TopicRule>,
}

impl RuleSet {
    /// Validate `rules` and split out the crisis rule.
    pub fn new(rules: Vec<TopicRule>) -> Res<Self> {
        let mut seen = HashSet::new();

        for rule in &rules {
            validate_rule(rule)?;

            if !seen.insert(rule.id.clone()) {
                return Err(anyhow!("Duplicate topic rule id `{}`.", rule.id));
            }
        }

        let crisis_count = rules.iter().filter(|r| r.is_crisis).count();
        if crisis_count != 1 {
            return Err(anyhow!("Exactly one crisis rule is required; found {crisis_count}."));
        }

        let (mut crisis, topics): (Vec<_>, Vec<_>) = rules.into_iter().partition(|r| r.is_crisis);
        let crisis = crisis.pop().ok_or_else(|| anyhow!("Missing crisis rule."))?;

        Ok(Self { crisis, topics })
    }

    /// The built-in rule table.
    pub fn builtin() -> Res<Self> {
        Self::new(builtin_rules())
    }

    /// Load and validate a TOML rule file.
    #[instrument(skip_all)]
    pub fn load(path: &Path) -> Res<Self> {
        let file: RuleFile = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| format!("Failed to read rule file `{}`.", path.display()))?;

        let result = Self::new(file.rules)?;

        info!("Loaded {} topic rules from `{}`.", result.rule_count(), path.display());

        Ok(result)
    }

    /// The crisis rule.
    pub fn crisis(&self) -> &TopicRule {
        &self.crisis
    }

    /// The non-crisis rules, in declaration order.
    pub fn topics(&self) -> &[TopicRule] {
        &self.topics
    }

    /// Total number of rules. Always at least one, since every set holds a crisis rule.
    pub fn rule_count(&self) -> usize {
        self.topics.len() + 1
    }
}

fn validate_rule(rule: &TopicRule) -> Res<()> {
    if rule.id.trim().is_empty() {
        return Err(anyhow!("Topic rule ids must not be empty."));
    }

    if rule.id == GENERAL_TOPIC_ID {
        return Err(anyhow!("Topic rule id `{GENERAL_TOPIC_ID}` is reserved for unmatched input."));
    }

    if rule.keywords.is_empty() {
        return Err(anyhow!("Topic rule `{}` has no keywords.", rule.id));
    }

    for keyword in &rule.keywords {
        if keyword.trim().is_empty() {
            return Err(anyhow!("Topic rule `{}` has an empty keyword.", rule.id));
        }

        if keyword.trim() != keyword {
            return Err(anyhow!("Keyword `{keyword}` in topic rule `{}` has surrounding whitespace.", rule.id));
        }

        if keyword.to_lowercase() != *keyword {
            return Err(anyhow!("Keyword `{keyword}` in topic rule `{}` must be lowercase.", rule.id));
        }
    }

    if rule.responses.is_empty() {
        return Err(anyhow!("Topic rule `{}` has no responses.", rule.id));
    }

    if rule.responses.iter().any(|r| r.trim().is_empty()) {
        return Err(anyhow!("Topic rule `{}` has a blank response.", rule.id));
    }

    Ok(())
}

// Built-in table.

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "take my own life",
    "want to die",
    "wanna die",
    "better off dead",
    "no reason to live",
    "self harm",
    "self-harm",
    "hurt myself",
    "hurting myself",
    "cut myself",
    "cutting myself",
];

const CRISIS_RESPONSES: &[&str] = &[
    "I'm really glad you told me, and I'm concerned about your safety. You don't have to go through this alone. Please call a crisis helpline right now or reach out to someone you trust. If you are in immediate danger, call emergency services.",
    "What you're feeling matters, and help is available right now. Please contact a crisis helpline or your campus counsellor immediately. If you might act on these thoughts, call emergency services or go to the nearest hospital.",
];

const ANXIETY_KEYWORDS: &[&str] = &["anxious", "anxiety", "panic", "nervous", "worried", "worrying", "overthinking", "on edge"];

const ANXIETY_RESPONSES: &[&str] = &[
    "It sounds like anxiety is weighing on you. Let's try a grounding exercise: breathe in for 4 counts, hold for 4, and breathe out for 6. Notice five things you can see around you.",
    "Feeling anxious is your body's way of trying to protect you, even when it overshoots. Would it help to write down exactly what you're worried about and sort it into what you can and can't control?",
    "Anxiety before something important is very common. Try slowing your breathing and naming the feeling out loud. What part of this feels the most overwhelming right now?",
];

const DEPRESSION_KEYWORDS: &[&str] = &["depressed", "depression", "hopeless", "worthless", "empty inside", "feel empty", "so sad", "feeling sad", "no motivation", "unmotivated", "feel numb"];

const DEPRESSION_RESPONSES: &[&str] = &[
    "I'm sorry you're feeling this low. Those feelings are real, and you deserve support. Small steps count: a short walk, a glass of water, or messaging one person you trust.",
    "When everything feels heavy, even getting through the day is an achievement. Have you been able to talk to anyone about how you've been feeling? A counsellor can really help.",
    "Thank you for sharing this with me. Low mood can make everything look darker than it is. Would you consider booking a session with a counsellor this week?",
];

const STRESS_KEYWORDS: &[&str] = &["stress", "overwhelmed", "pressure", "burnout", "burnt out", "burned out", "too much to do", "exhausted"];

const STRESS_RESPONSES: &[&str] = &[
    "That sounds like a lot to carry. Let's break it down: what is the one task that would make the biggest difference if you finished it today?",
    "Stress builds up when there's no room to recover. Try scheduling a short break every hour, even five minutes away from the screen helps.",
    "Feeling overwhelmed is a sign you need support, not that you're failing. Could you share what's on your plate so we can prioritise together?",
];

const SLEEP_KEYWORDS: &[&str] = &["sleep", "insomnia", "nightmare", "awake all night", "can't rest", "tired all the time"];

const SLEEP_RESPONSES: &[&str] = &[
    "Sleep troubles can affect everything else. Try keeping a consistent bedtime, and put your phone away 30 minutes before bed.",
    "Not sleeping well is exhausting. A short wind-down routine, like dim lights, light stretching, or journaling your thoughts, can help your mind settle.",
    "If racing thoughts keep you up, try writing them down before bed so your mind doesn't have to hold on to them overnight.",
];

const LONELINESS_KEYWORDS: &[&str] = &["lonely", "loneliness", "alone", "isolated", "no friends", "left out", "nobody cares"];

const LONELINESS_RESPONSES: &[&str] = &[
    "Feeling lonely is really hard, and a lot of students feel this way even if it doesn't show. Have you looked at any clubs or peer support groups on campus?",
    "You're not alone in feeling alone. Reaching out to one person, even with a small message, can be a good first step. I'm here to talk too.",
];

const ACADEMIC_KEYWORDS: &[&str] = &["exam", "grades", "marks", "assignment", "deadline", "semester", "study", "studies", "failing", "backlog", "placement"];

const ACADEMIC_RESPONSES: &[&str] = &[
    "Academic pressure is tough. Try breaking your study time into 25-minute focused blocks with short breaks in between, and start with the topic you're dreading most.",
    "Your grades don't define your worth. Would it help to make a simple plan for the next few days, with time for rest built in?",
    "Many students find it useful to talk to a faculty mentor about workload. Remember that asking for an extension or help is a sign of strength.",
];

const RELATIONSHIP_KEYWORDS: &[&str] = &["breakup", "break up", "broke up", "relationship", "boyfriend", "girlfriend", "partner", "heartbroken", "crush"];

const RELATIONSHIP_RESPONSES: &[&str] = &[
    "Relationship difficulties can hurt a lot. It's okay to give yourself time to feel what you're feeling. Do you have a friend you can lean on right now?",
    "Heartbreak is a real loss. Be gentle with yourself, and try to keep up small routines like eating well and getting outside.",
];

const FAMILY_KEYWORDS: &[&str] = &["family", "parents", "mother", "father", "my mom", "my dad", "siblings", "homesick"];

const FAMILY_RESPONSES: &[&str] = &[
    "Family situations can be complicated, especially when you're away at college. What feels hardest about it right now?",
    "It's natural to miss home or feel torn by expectations. Setting up a regular call with someone at home can help you feel more connected.",
];

const ANGER_KEYWORDS: &[&str] = &["angry", "anger", "furious", "frustrated", "irritated", "annoyed", "mad at"];

const ANGER_RESPONSES: &[&str] = &[
    "It sounds like you're really frustrated. Anger often points to something that matters to us. Try stepping away for a few minutes and taking some deep breaths.",
    "Strong feelings like anger are valid. Physical activity, like a brisk walk, can help release some of that energy before you decide what to do next.",
];

const SELF_ESTEEM_KEYWORDS: &[&str] = &["not good enough", "hate myself", "i'm a failure", "im a failure", "ugly", "insecure", "compare myself", "imposter"];

const SELF_ESTEEM_RESPONSES: &[&str] = &[
    "I hear how hard you're being on yourself. Try talking to yourself the way you'd talk to a close friend. What's one thing you did well this week?",
    "Comparing yourself to others rarely shows the full picture. You're allowed to grow at your own pace.",
];

const GRATITUDE_KEYWORDS: &[&str] = &["thank you", "thanks", "feeling better", "that helped", "feel better"];

const GRATITUDE_RESPONSES: &[&str] = &[
    "I'm really glad that helped. Remember, you can come back and talk any time.",
    "Thank you for sharing with me. Keep being kind to yourself, and don't hesitate to reach out again.",
];

/// The built-in rules, crisis rule first, the rest in evaluation order.
pub fn builtin_rules() -> Vec<TopicRule> {
    vec![
        TopicRule::new("crisis", CRISIS_KEYWORDS, CRISIS_RESPONSES, true),
        TopicRule::new("anxiety", ANXIETY_KEYWORDS, ANXIETY_RESPONSES, false),
        TopicRule::new("depression", DEPRESSION_KEYWORDS, DEPRESSION_RESPONSES, false),
        TopicRule::new("stress", STRESS_KEYWORDS, STRESS_RESPONSES, false),
        TopicRule::new("sleep", SLEEP_KEYWORDS, SLEEP_RESPONSES, false),
        TopicRule::new("loneliness", LONELINESS_KEYWORDS, LONELINESS_RESPONSES, false),
        TopicRule::new("academic", ACADEMIC_KEYWORDS, ACADEMIC_RESPONSES, false),
        TopicRule::new("relationships", RELATIONSHIP_KEYWORDS, RELATIONSHIP_RESPONSES, false),
        TopicRule::new("family", FAMILY_KEYWORDS, FAMILY_RESPONSES, false),
        TopicRule::new("anger", ANGER_KEYWORDS, ANGER_RESPONSES, false),
        TopicRule::new("self-esteem", SELF_ESTEEM_KEYWORDS, SELF_ESTEEM_RESPONSES, false),
        TopicRule::new("gratitude", GRATITUDE_KEYWORDS, GRATITUDE_RESPONSES, false),
    ]
}

// Tests.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn rule(id: &str, keywords: &[&str], is_crisis: bool) -> TopicRule {
        TopicRule::new(id, keywords, &["A reply."], is_crisis)
    }

    #[test]
    fn test_builtin_rules_are_valid() {
        let rules = RuleSet::builtin().unwrap();

        assert_eq!(rules.crisis().id, "crisis");
        assert!(rules.crisis().is_crisis);
        assert_eq!(rules.topics()[0].id, "anxiety");
        assert!(rules.topics().iter().all(|r| !r.is_crisis));
        assert_eq!(rules.rule_count(), builtin_rules().len());
    }

    #[test]
    fn test_crisis_rule_is_split_out_regardless_of_position() {
        let rules = RuleSet::new(vec![rule("sleep", &["sleep"], false), rule("danger", &["suicide"], true), rule("stress", &["stress"], false)]).unwrap();

        assert_eq!(rules.crisis().id, "danger");
        let ids: Vec<_> = rules.topics().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["sleep", "stress"]);
    }

    #[test]
    fn test_rejects_missing_crisis_rule() {
        let result = RuleSet::new(vec![rule("sleep", &["sleep"], false)]);

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_multiple_crisis_rules() {
        let result = RuleSet::new(vec![rule("a", &["suicide"], true), rule("b", &["self harm"], true)]);

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_uppercase_keyword() {
        let result = RuleSet::new(vec![rule("crisis", &["suicide"], true), rule("sleep", &["Sleep"], false)]);

        assert!(result.unwrap_err().to_string().contains("lowercase"));
    }

    #[test]
    fn test_rejects_empty_keywords() {
        assert!(RuleSet::new(vec![rule("crisis", &["suicide"], true), rule("sleep", &[], false)]).is_err());
        assert!(RuleSet::new(vec![rule("crisis", &["suicide"], true), rule("sleep", &[""], false)]).is_err());
    }

    #[test]
    fn test_rejects_missing_responses() {
        let mut sleep = rule("sleep", &["sleep"], false);
        sleep.responses.clear();

        assert!(RuleSet::new(vec![rule("crisis", &["suicide"], true), sleep]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_and_reserved_ids() {
        assert!(RuleSet::new(vec![rule("crisis", &["suicide"], true), rule("sleep", &["sleep"], false), rule("sleep", &["tired"], false)]).is_err());
        assert!(RuleSet::new(vec![rule("crisis", &["suicide"], true), rule("general", &["hello"], false)]).is_err());
    }

    #[test]
    fn test_load_rule_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[rules]]
id = "crisis"
keywords = ["suicide"]
responses = ["Please call a helpline."]
is_crisis = true

[[rules]]
id = "exams"
keywords = ["exam", "test"]
responses = ["Exams are stressful.", "You've got this."]
"#
        )
        .unwrap();

        let rules = RuleSet::load(file.path()).unwrap();

        assert_eq!(rules.crisis().id, "crisis");
        assert_eq!(rules.topics().len(), 1);
        assert_eq!(rules.topics()[0].responses.len(), 2);
        assert!(!rules.topics()[0].is_crisis);
        assert_eq!(rules.rule_count(), 2);
    }

    #[test]
    fn test_load_missing_rule_file_fails() {
        let result = RuleSet::load(Path::new("does/not/exist.toml"));

        assert!(result.is_err());
    }
}
