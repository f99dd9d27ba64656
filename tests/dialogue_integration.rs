//! Integration tests for the reminder dialogue.
//!
//! These tests drive `ChatService` end to end against a fake YandexGPT
//! endpoint (wiremock):
//! 1. `/start` registers the chat
//! 2. An `ask` answer extends the stored history
//! 3. A `final` answer clears the history, stores the task and is confirmed
//!    by the finalizer
//!
//! Storage is in memory; the digest sender records instead of delivering.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use advent_bot::adapters::ai::{MockTokenCounter, YandexConfig, YandexGptProvider, YandexTokenizer};
use advent_bot::adapters::notify::RecordingSender;
use advent_bot::adapters::storage::{
    InMemoryChatRepository, InMemoryMessageRepository, InMemoryTaskRepository,
};
use advent_bot::adapters::FixedClock;
use advent_bot::application::{
    ChatService, ContextSummarizer, DialogueEngine, DialogueRules, SchedulerContext,
    SchedulerManager, SummarizationBudget, SummaryRules, TaskDigestSummarizer, TaskFinalizer,
};
use advent_bot::domain::conversation::replies;
use advent_bot::domain::foundation::ChatId;
use advent_bot::domain::task::Task;
use advent_bot::ports::{CompletionProvider, TaskRepository, TokenCounter};
use chrono::{TimeZone, Utc};

const CHAT: ChatId = ChatId::new(42);
const COMPLETION_PATH: &str = "/foundationModels/v1/completion";
const TOKENIZE_PATH: &str = "/foundationModels/v1/tokenize";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    server: MockServer,
    messages: Arc<InMemoryMessageRepository>,
    tasks: Arc<InMemoryTaskRepository>,
    schedulers: Arc<SchedulerManager>,
    service: ChatService,
}

fn yandex_config(server: &MockServer, api_key: &str) -> YandexConfig {
    YandexConfig::new(api_key, "b1gfolder")
        .with_completion_url(format!("{}{}", server.uri(), COMPLETION_PATH))
        .with_timeout(Duration::from_secs(5))
}

fn completion_body(text: &str) -> Value {
    json!({
        "result": {
            "alternatives": [{
                "message": {"role": "assistant", "text": text},
                "status": "ALTERNATIVE_STATUS_FINAL"
            }],
            "usage": {
                "inputTextTokens": "42",
                "completionTokens": "7",
                "totalTokens": "49"
            },
            "modelVersion": "23.10.2024"
        }
    })
}

async fn mount_completion(server: &MockServer, rule: &str, text: &str, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(body_string_contains(rule))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(text)));

    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

async fn harness_with(api_key: &str, tokenizer: Option<Arc<dyn TokenCounter>>) -> Harness {
    let server = MockServer::start().await;
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(YandexGptProvider::new(yandex_config(&server, api_key)).unwrap());
    let tokenizer = tokenizer.unwrap_or_else(|| Arc::new(MockTokenCounter::fixed(1)));

    let chats = Arc::new(InMemoryChatRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap()));

    let summarizer = Arc::new(ContextSummarizer::new(
        provider.clone(),
        tokenizer,
        SummaryRules {
            prompt: "PROMPT-SUMMARY-RULE".to_string(),
            history: "HISTORY-SUMMARY-RULE".to_string(),
        },
        "yandexgpt-5-lite/latest",
        SummarizationBudget::default(),
    ));
    let engine = Arc::new(DialogueEngine::new(
        provider.clone(),
        summarizer,
        Arc::new(TaskFinalizer::new(
            provider.clone(),
            "FINALIZER-RULE",
            "yandexgpt-5-lite/latest",
        )),
        messages.clone(),
        tasks.clone(),
        clock.clone(),
        DialogueRules {
            dialogue: "DIALOGUE-RULE".to_string(),
            chain_of_thought: "COT-RULE".to_string(),
        },
        "yandexgpt-5-pro/latest",
    ));
    let schedulers = Arc::new(SchedulerManager::new(
        SchedulerContext {
            chats: chats.clone(),
            tasks: tasks.clone(),
            summarizer: Arc::new(TaskDigestSummarizer::new(provider, "DIGEST-RULE", "yandexgpt-lite")),
            sender: Arc::new(RecordingSender::new()),
            clock: clock.clone(),
        },
        Duration::from_secs(3600),
    ));

    let service = ChatService::new(
        chats,
        messages.clone(),
        tasks.clone(),
        engine,
        schedulers.clone(),
        clock,
    );

    Harness {
        server,
        messages,
        tasks,
        schedulers,
        service,
    }
}

async fn harness() -> Harness {
    harness_with("test-key", None).await
}

// =============================================================================
// Ask / Final Flow
// =============================================================================

#[tokio::test]
async fn ask_then_final_stores_task_and_clears_history() {
    let h = harness().await;
    mount_completion(
        &h.server,
        "DIALOGUE-RULE",
        r#"{"mode":"ask","question":"Во сколько встреча?","property":"dateTime"}"#,
        Some(1),
    )
    .await;
    mount_completion(
        &h.server,
        "DIALOGUE-RULE",
        "```json\n{\"mode\":\"final\",\"task\":\"Встреча\",\"dateTime\":\"2024-03-01T10:00:00+03:00\",\"location\":\"офис\"}\n```",
        None,
    )
    .await;
    mount_completion(
        &h.server,
        "FINALIZER-RULE",
        r#"{"mode":"finalized","message":"Напомню о встрече 1 марта в 10:00"}"#,
        None,
    )
    .await;

    h.service.start(CHAT, "Europe/Moscow").await;

    let first = h.service.handle_text(CHAT, "Напомни про встречу в офисе", 1_709_272_000).await;
    assert_eq!(
        first,
        vec!["Во сколько встреча?\n\n📱 Модель: 23.10.2024\n🔤 Токены: 42/7 (вход/выход)".to_string()]
    );
    assert_eq!(h.messages.count(CHAT).await, 2);

    let second = h.service.handle_text(CHAT, "в 10 утра", 1_709_272_100).await;
    assert_eq!(
        second,
        vec![
            "Напомню о встрече 1 марта в 10:00\n\n📱 Модель: 23.10.2024\n\n🔤 Токены: 42/7 (вход/выход)"
                .to_string()
        ]
    );

    assert_eq!(h.messages.count(CHAT).await, 0);
    assert_eq!(
        h.tasks.get_all(CHAT).await.unwrap(),
        vec![Task::new(CHAT, "Встреча", "2024-03-01T10:00:00+03:00", "офис")]
    );
    assert_eq!(h.service.today(CHAT).await.len(), 2);

    h.schedulers.shutdown().await;
}

#[tokio::test]
async fn finalizer_failure_uses_template_reply() {
    let h = harness().await;
    mount_completion(
        &h.server,
        "DIALOGUE-RULE",
        r#"{"mode":"final","task":"Звонок","dateTime":"2024-03-01T18:00:00Z","location":""}"#,
        None,
    )
    .await;
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(body_string_contains("FINALIZER-RULE"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    h.service.start(CHAT, "UTC").await;
    let reply = h.service.handle_text(CHAT, "позвонить маме в 18", 1).await;

    assert_eq!(
        reply,
        vec!["Задача: Звонок\nДата/время: 2024-03-01T18:00:00Z\nМесто: \n\n📱 Модель: 23.10.2024".to_string()]
    );
    assert_eq!(h.tasks.count().await, 1);

    h.schedulers.shutdown().await;
}

// =============================================================================
// Failure Replies
// =============================================================================

#[tokio::test]
async fn service_error_gets_fixed_reply() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    h.service.start(CHAT, "UTC").await;
    let reply = h.service.handle_text(CHAT, "привет", 1).await;

    assert_eq!(reply, vec![replies::REQUEST_FAILED.to_string()]);
    assert_eq!(h.messages.count(CHAT).await, 0);

    h.schedulers.shutdown().await;
}

#[tokio::test]
async fn ask_without_question_gets_fixed_reply() {
    let h = harness().await;
    mount_completion(&h.server, "DIALOGUE-RULE", r#"{"mode":"ask","question":"  "}"#, None).await;

    h.service.start(CHAT, "UTC").await;
    let reply = h.service.handle_text(CHAT, "напомни", 1).await;

    assert_eq!(reply, vec![replies::REQUEST_FAILED.to_string()]);
    assert_eq!(h.messages.count(CHAT).await, 0);

    h.schedulers.shutdown().await;
}

#[tokio::test]
async fn missing_credentials_never_reach_the_service() {
    let h = harness_with("", None).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .expect(0)
        .mount(&h.server)
        .await;

    h.service.start(CHAT, "UTC").await;
    let reply = h.service.handle_text(CHAT, "привет", 1).await;

    assert_eq!(reply, vec![replies::REQUEST_FAILED.to_string()]);
    h.schedulers.shutdown().await;
}

// =============================================================================
// Summarization
// =============================================================================

#[tokio::test]
async fn long_history_is_summarized_once() {
    let server = MockServer::start().await;
    let tokenize_url = format!("{}{}", server.uri(), TOKENIZE_PATH);
    let many_tokens: Vec<Value> = (0..600).map(|i| json!({"id": i.to_string(), "text": "x"})).collect();

    Mock::given(method("POST"))
        .and(path(TOKENIZE_PATH))
        .and(body_string_contains("messages_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tokens": many_tokens})))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKENIZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tokens": [{"id": "1"}]})))
        .mount(&server)
        .await;

    let tokenizer: Arc<dyn TokenCounter> = Arc::new(
        YandexTokenizer::new(
            yandex_config(&server, "test-key"),
            "yandexgpt-5-lite/latest",
            tokenize_url,
        )
        .unwrap(),
    );
    let h = harness_with("test-key", Some(tokenizer)).await;

    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(body_string_contains("HISTORY-SUMMARY-RULE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("краткая история")))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(body_string_contains("PROMPT-SUMMARY-RULE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("сжатое правило")))
        .expect(0)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(body_string_contains("краткая история"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"mode":"ask","question":"Когда?"}"#,
        )))
        .expect(1)
        .mount(&h.server)
        .await;

    h.service.start(CHAT, "UTC").await;
    let reply = h.service.handle_text(CHAT, "длинное сообщение", 1).await;

    assert!(reply[0].starts_with("Когда?"));
    h.schedulers.shutdown().await;
}
