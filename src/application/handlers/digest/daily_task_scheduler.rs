//! DailyTaskScheduler - Periodic digest of the tasks due today.
//!
//! A pass loads the chat's tasks for its current local date, asks the digest
//! summarizer to word them and sends the result as a single message.
//!
//! # Timing
//!
//! | Event | When |
//! |-------|------|
//! | First pass | Immediately when the loop starts |
//! | Next passes | Every `interval` (24 h by default) |
//! | Stop | When the stop signal turns `true` or its sender is dropped |
//!
//! A pass already in progress is finished before the loop exits.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::digest_summarizer::TaskDigestSummarizer;
use crate::domain::foundation::{ChatId, DomainError};
use crate::domain::task::format_digest_block;
use crate::ports::{ChatRepository, Clock, MessageSender, TaskRepository};

/// Collaborators shared by every scheduler.
#[derive(Clone)]
pub struct SchedulerContext {
    pub chats: Arc<dyn ChatRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub summarizer: Arc<TaskDigestSummarizer>,
    pub sender: Arc<dyn MessageSender>,
    pub clock: Arc<dyn Clock>,
}

pub struct DailyTaskScheduler {
    chat_id: ChatId,
    interval: Duration,
    ctx: SchedulerContext,
}

impl DailyTaskScheduler {
    pub fn new(chat_id: ChatId, interval: Duration, ctx: SchedulerContext) -> Self {
        Self {
            chat_id,
            interval,
            ctx,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run passes until `stop` turns `true` or its sender is dropped.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(chat_id = %self.chat_id, interval_secs = self.interval.as_secs(), "Scheduler started");

        loop {
            tokio::select! {
                biased;

                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }

                _ = interval.tick() => {
                    self.process_now().await;
                }
            }
        }

        tracing::info!(chat_id = %self.chat_id, "Scheduler stopped");
    }

    /// Run one pass now and return how many tasks it covered.
    ///
    /// Errors are logged and count as zero.
    pub async fn process_now(&self) -> usize {
        match self.try_process().await {
            Ok(count) => count,
            Err(err) => {
                tracing::error!(chat_id = %self.chat_id, error = %err, details = ?err.details, "Digest pass failed");
                0
            }
        }
    }

    /// Run one pass now.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if today's tasks cannot be loaded
    /// - `DeliveryFailed` if the digest cannot be sent
    pub async fn try_process(&self) -> Result<usize, DomainError> {
        let today = local_today(self.ctx.chats.as_ref(), self.ctx.clock.as_ref(), self.chat_id).await;
        let tasks = self.ctx.tasks.get_today(self.chat_id, today).await?;

        if tasks.is_empty() {
            tracing::debug!(chat_id = %self.chat_id, date = %today, "No tasks due today");
            return Ok(0);
        }

        let block = format_digest_block(&tasks);
        let digest = match self.ctx.summarizer.summarize(&block).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(chat_id = %self.chat_id, error = %err, "Digest summarization failed, sending plain list");
                block
            }
        };

        self.ctx.sender.send(self.chat_id, &digest).await?;

        tracing::info!(chat_id = %self.chat_id, tasks = tasks.len(), "Digest sent");
        Ok(tasks.len())
    }
}

/// The chat's current date in its stored timezone. Unknown chats and
/// unreadable settings use the UTC date.
pub(crate) async fn local_today(
    chats: &dyn ChatRepository,
    clock: &dyn Clock,
    chat_id: ChatId,
) -> NaiveDate {
    match chats.get_by_id(chat_id).await {
        Ok(Some(timezone)) => clock.today_in(&timezone),
        Ok(None) => clock.today(),
        Err(err) => {
            tracing::warn!(chat_id = %chat_id, error = %err, "Failed to load chat timezone, using UTC date");
            clock.today()
        }
    }
}
