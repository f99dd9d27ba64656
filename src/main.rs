//! Advent Bot console runner.
//!
//! Wires the YandexGPT adapters, in-memory storage and the console sender
//! together and drives a single chat from stdin:
//!
//! ```text
//! /start [timezone]   remember the timezone and start the daily digest
//! /today              tasks due today
//! /tasks              every stored task
//! /trigger            send the digest now
//! /restart            forget the chat
//! anything else       a dialogue turn
//! ```

use secrecy::ExposeSecret;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use advent_bot::adapters::ai::{YandexConfig, YandexGptProvider, YandexTokenizer};
use advent_bot::adapters::notify::ConsoleSender;
use advent_bot::adapters::storage::{
    InMemoryChatRepository, InMemoryMessageRepository, InMemoryTaskRepository,
};
use advent_bot::adapters::SystemClock;
use advent_bot::application::{
    ChatService, ContextSummarizer, DialogueEngine, DialogueRules, SchedulerContext,
    SchedulerManager, SummarizationBudget, SummaryRules, TaskDigestSummarizer, TaskFinalizer,
};
use advent_bot::config::{AppConfig, LogConfig};
use advent_bot::domain::foundation::ChatId;
use advent_bot::ports::{Clock, CompletionProvider, MessageSender};

const CONSOLE_CHAT: ChatId = ChatId::new(1);

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.log);
    config.validate()?;

    let rules = config.rules.load()?;
    tracing::info!(
        dialogue_model = %config.ai.dialogue_model,
        chain_of_thought = config.ai.chain_of_thought,
        "advent-bot starting"
    );

    let yandex = YandexConfig::new(config.ai.api_key.expose_secret().clone(), &config.ai.folder_id)
        .with_completion_url(&config.ai.completion_url)
        .with_default_model(&config.ai.dialogue_model)
        .with_timeout(config.ai.timeout());
    let provider: Arc<dyn CompletionProvider> = Arc::new(YandexGptProvider::new(yandex.clone())?);
    let info = provider.provider_info();
    tracing::info!(provider = %info.name, default_model = %info.default_model, "Completion provider ready");
    let tokenizer = Arc::new(YandexTokenizer::new(
        yandex.with_timeout(config.ai.tokenize_timeout()),
        &config.ai.summarizer_model,
        &config.ai.tokenize_url,
    )?);

    let chats = Arc::new(InMemoryChatRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sender: Arc<dyn MessageSender> = Arc::new(ConsoleSender::new());

    let summarization = &config.summarization;
    let summarizer = Arc::new(ContextSummarizer::new(
        provider.clone(),
        tokenizer,
        SummaryRules {
            prompt: rules.prompt_summary,
            history: rules.history_summary,
        },
        &config.ai.summarizer_model,
        SummarizationBudget::new(
            summarization.max_prompt_tokens,
            summarization.max_history_tokens,
            summarization.max_output_tokens,
        ),
    ));
    let finalizer = Arc::new(TaskFinalizer::new(
        provider.clone(),
        rules.finalizer,
        &config.ai.finalizer_model,
    ));
    let engine = Arc::new(DialogueEngine::new(
        provider.clone(),
        summarizer,
        finalizer,
        messages.clone(),
        tasks.clone(),
        clock.clone(),
        DialogueRules {
            dialogue: rules.dialogue,
            chain_of_thought: rules.dialogue_cot,
        },
        &config.ai.dialogue_model,
    ));
    let schedulers = Arc::new(SchedulerManager::new(
        SchedulerContext {
            chats: chats.clone(),
            tasks: tasks.clone(),
            summarizer: Arc::new(TaskDigestSummarizer::new(
                provider,
                rules.digest,
                &config.ai.digest_model,
            )),
            sender: sender.clone(),
            clock: clock.clone(),
        },
        config.scheduler.interval(),
    ));

    let service = ChatService::new(chats, messages, tasks, engine, schedulers.clone(), clock.clone())
        .with_chain_of_thought(config.ai.chain_of_thought);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let replies = match line.split_once(' ').unwrap_or((line, "")) {
            ("/start", tz) => service.start(CONSOLE_CHAT, tz).await,
            ("/today", _) => service.today(CONSOLE_CHAT).await,
            ("/tasks", _) => service.tasks(CONSOLE_CHAT).await,
            ("/trigger", _) => service.trigger(CONSOLE_CHAT).await,
            ("/restart", _) => service.restart(CONSOLE_CHAT).await,
            _ => {
                service
                    .handle_text(CONSOLE_CHAT, line, clock.now().timestamp())
                    .await
            }
        };

        for reply in replies {
            if let Err(err) = sender.send(CONSOLE_CHAT, &reply).await {
                tracing::error!(error = %err, "Failed to print reply");
            }
        }
    }

    schedulers.shutdown().await;
    tracing::info!("advent-bot stopped");
    Ok(())
}
