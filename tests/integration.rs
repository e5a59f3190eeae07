#![cfg(test)]

use std::{
    collections::VecDeque,
    io::Write,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use care_triage::{
    base::{
        config::{Config, ConfigInner},
        types::{ConversationTurn, CrisisResource, GENERAL_TOPIC_ID, Res, Speaker, Void},
    },
    interaction::{chat_event::handle_chat_event, conversation::Session},
    runtime::{Runtime, build_triage, respond_once},
    service::{
        chat::{ChatClient, GenericChatClient},
        triage::MatchMode,
    },
};
use mockall::mock;

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn read_message(&self) -> Res<Option<String>>;
        async fn show_typing(&self, assistant_name: &str) -> Void;
        async fn send_turn(&self, assistant_name: &str, turn: &ConversationTurn) -> Void;
        async fn show_crisis_resources(&self, resources: &[CrisisResource]) -> Void;
    }
}

/// Turns and resource counts recorded by the mock chat client.
#[derive(Default)]
struct Recorded {
    turns: Mutex<Vec<ConversationTurn>>,
    crisis_renders: Mutex<Vec<usize>>,
}

fn get_mock_chat(inputs: Vec<&str>, recorded: Arc<Recorded>) -> MockChat {
    let mut mock = MockChat::new();

    let queue = Mutex::new(inputs.into_iter().map(str::to_string).collect::<VecDeque<_>>());
    mock.expect_read_message().returning(move || Ok(queue.lock().unwrap().pop_front()));

    mock.expect_show_typing().returning(|_| Ok(()));

    let turns = recorded.clone();
    mock.expect_send_turn().returning(move |_, turn| {
        turns.turns.lock().unwrap().push(turn.clone());
        Ok(())
    });

    let renders = recorded.clone();
    mock.expect_show_crisis_resources().returning(move |resources| {
        renders.crisis_renders.lock().unwrap().push(resources.len());
        Ok(())
    });

    mock
}

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            typing_delay_ms: 0,
            rng_seed: Some(1),
            ..Default::default()
        }),
    }
}

/// Helper function to setup the test environment.
fn setup_test_environment(config: Config, chat: MockChat) -> Runtime {
    let triage = build_triage(&config).expect("Failed to build triage engine");
    let chat = ChatClient::new(Arc::new(chat));

    Runtime { config, triage, chat }
}

#[tokio::test]
async fn test_crisis_message_escalates() {
    let recorded = Arc::new(Recorded::default());
    let runtime = setup_test_environment(test_config(), get_mock_chat(vec![], recorded.clone()));
    let mut session = Session::new(&runtime.config);

    handle_chat_event("I want to kill myself", &mut session, &runtime).await.unwrap();

    let turns = session.conversation.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].speaker(), Speaker::User);
    assert_eq!(turns[1].speaker(), Speaker::System);
    assert_eq!(turns[1].topic_id(), Some("crisis"));
    assert!(turns[1].is_crisis());
    assert!(session.conversation.crisis_flagged());

    assert_eq!(recorded.turns.lock().unwrap().len(), 1);
    assert_eq!(*recorded.crisis_renders.lock().unwrap(), vec![runtime.config.crisis_resources.len()]);
}

#[tokio::test]
async fn test_topic_message_does_not_escalate() {
    let mut chat = MockChat::new();
    chat.expect_show_typing().times(1).returning(|_| Ok(()));
    chat.expect_send_turn().times(1).withf(|name, turn| name.to_string() == "Sahara" && turn.topic_id() == Some("anxiety")).returning(|_, _| Ok(()));
    chat.expect_show_crisis_resources().times(0);

    let runtime = setup_test_environment(test_config(), chat);
    let mut session = Session::new(&runtime.config);

    handle_chat_event("I'm feeling really anxious about my exam", &mut session, &runtime).await.unwrap();

    assert!(!session.conversation.crisis_flagged());
    assert_eq!(session.conversation.recent_topics().collect::<Vec<_>>(), vec!["anxiety"]);
}

#[tokio::test]
async fn test_blank_message_is_ignored() {
    let mut chat = MockChat::new();
    chat.expect_show_typing().times(0);
    chat.expect_send_turn().times(0);
    chat.expect_show_crisis_resources().times(0);

    let runtime = setup_test_environment(test_config(), chat);
    let mut session = Session::new(&runtime.config);

    handle_chat_event("   ", &mut session, &runtime).await.unwrap();

    assert!(session.conversation.turns().is_empty());
}

#[tokio::test]
async fn test_typing_delay_is_applied() {
    let recorded = Arc::new(Recorded::default());
    let config = Config {
        inner: Arc::new(ConfigInner {
            typing_delay_ms: 20,
            ..Default::default()
        }),
    };
    let runtime = setup_test_environment(config, get_mock_chat(vec![], recorded.clone()));
    let mut session = Session::new(&runtime.config);

    let started = Instant::now();
    handle_chat_event("I can't sleep at night", &mut session, &runtime).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(recorded.turns.lock().unwrap()[0].topic_id(), Some("sleep"));
}

#[tokio::test]
async fn test_full_session() {
    let recorded = Arc::new(Recorded::default());
    let inputs = vec!["Tell me a joke", "", "I can't sleep at night", "I'm stressed and I want to die", "thanks, that helped"];
    let runtime = setup_test_environment(test_config(), get_mock_chat(inputs, recorded.clone()));

    runtime.start().await.unwrap();

    let turns = recorded.turns.lock().unwrap();

    // Greeting plus one reply per non-blank message.
    assert_eq!(turns.len(), 5);
    assert_eq!(turns[0].text(), runtime.config.greeting);

    let topics: Vec<_> = turns.iter().skip(1).map(|t| t.topic_id().unwrap_or_default()).collect();
    assert_eq!(topics, vec![GENERAL_TOPIC_ID, "sleep", "crisis", "gratitude"]);

    assert_eq!(recorded.crisis_renders.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_general_reply_uses_configured_fallback() {
    let recorded = Arc::new(Recorded::default());
    let config = Config {
        inner: Arc::new(ConfigInner {
            typing_delay_ms: 0,
            fallback_responses: vec!["Only reply.".to_string()],
            ..Default::default()
        }),
    };
    let runtime = setup_test_environment(config, get_mock_chat(vec![], recorded.clone()));
    let mut session = Session::new(&runtime.config);

    handle_chat_event("Tell me a joke", &mut session, &runtime).await.unwrap();

    let turns = recorded.turns.lock().unwrap();
    assert_eq!(turns[0].text(), "Only reply.");
    assert_eq!(turns[0].topic_id(), Some(GENERAL_TOPIC_ID));
    assert!(session.conversation.recent_topics().next().is_none());
}

#[test]
fn test_custom_rule_file_with_word_boundaries() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[[rules]]
id = "crisis"
keywords = ["die"]
responses = ["Please call a helpline now."]
is_crisis = true

[[rules]]
id = "food"
keywords = ["diet", "meal"]
responses = ["Try to eat regular meals."]
"#
    )
    .unwrap();

    let config = Config {
        inner: Arc::new(ConfigInner {
            rules_path: Some(file.path().to_path_buf()),
            match_mode: MatchMode::WordBoundary,
            ..Default::default()
        }),
    };

    let food = respond_once(&config, "My diet is a mess").unwrap();
    assert_eq!(food.topic_id, "food");
    assert!(!food.is_crisis);

    let crisis = respond_once(&config, "I want to DIE").unwrap();
    assert_eq!(crisis.topic_id, "crisis");
    assert!(crisis.is_crisis);
    assert_eq!(crisis.response_text, "Please call a helpline now.");
}

#[test]
fn test_invalid_rule_file_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[[rules]]
id = "sleep"
keywords = ["Sleep"]
responses = ["Rest."]
"#
    )
    .unwrap();

    let config = Config {
        inner: Arc::new(ConfigInner {
            rules_path: Some(file.path().to_path_buf()),
            ..Default::default()
        }),
    };

    assert!(build_triage(&config).is_err());
}

#[test]
fn test_respond_once_with_seed_is_reproducible() {
    let config = test_config();

    let first = respond_once(&config, "I feel so anxious").unwrap();
    let second = respond_once(&config, "I feel so anxious").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.topic_id, "anxiety");
}
