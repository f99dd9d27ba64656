//! Registry of running schedulers, one per chat.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use super::daily_task_scheduler::{DailyTaskScheduler, SchedulerContext};
use crate::domain::foundation::ChatId;

struct SchedulerEntry {
    scheduler: Arc<DailyTaskScheduler>,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Starts, stops and looks up per-chat schedulers.
///
/// At most one scheduler runs per chat. Registry changes are serialized by a
/// single lock; digest passes run outside of it.
pub struct SchedulerManager {
    ctx: SchedulerContext,
    interval: Duration,
    schedulers: RwLock<HashMap<ChatId, SchedulerEntry>>,
}

impl SchedulerManager {
    pub fn new(ctx: SchedulerContext, interval: Duration) -> Self {
        Self {
            ctx,
            interval,
            schedulers: RwLock::new(HashMap::new()),
        }
    }

    /// Start a scheduler for `chat_id`.
    ///
    /// Returns `false` without doing anything if one is already running.
    pub async fn add_scheduler(&self, chat_id: ChatId) -> bool {
        let mut schedulers = self.schedulers.write().await;
        if schedulers.contains_key(&chat_id) {
            tracing::debug!(chat_id = %chat_id, "Scheduler already registered");
            return false;
        }

        let scheduler = Arc::new(DailyTaskScheduler::new(chat_id, self.interval, self.ctx.clone()));
        let (stop, stop_rx) = watch::channel(false);
        let handle = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run(stop_rx).await })
        };

        schedulers.insert(
            chat_id,
            SchedulerEntry {
                scheduler,
                stop,
                handle,
            },
        );
        tracing::info!(chat_id = %chat_id, "Scheduler registered");
        true
    }

    /// Stop and forget the scheduler of `chat_id`.
    ///
    /// Returns `false` if there was none. The loop exits after any pass it
    /// is currently running.
    pub async fn remove_scheduler(&self, chat_id: ChatId) -> bool {
        let Some(entry) = self.schedulers.write().await.remove(&chat_id) else {
            return false;
        };

        // The loop also exits when the sender drops, so a send error is harmless.
        let _ = entry.stop.send(true);
        tracing::info!(chat_id = %chat_id, "Scheduler removed");
        true
    }

    pub async fn get_scheduler(&self, chat_id: ChatId) -> Option<Arc<DailyTaskScheduler>> {
        self.schedulers
            .read()
            .await
            .get(&chat_id)
            .map(|entry| entry.scheduler.clone())
    }

    /// Run a digest pass for `chat_id` right away.
    ///
    /// Returns `None` if the chat has no scheduler.
    pub async fn process_now(&self, chat_id: ChatId) -> Option<usize> {
        let scheduler = self.get_scheduler(chat_id).await?;
        Some(scheduler.process_now().await)
    }

    /// Run a digest pass for every registered chat concurrently.
    pub async fn process_all_now(&self) -> Vec<(ChatId, usize)> {
        let schedulers: Vec<Arc<DailyTaskScheduler>> = self
            .schedulers
            .read()
            .await
            .values()
            .map(|entry| entry.scheduler.clone())
            .collect();

        join_all(schedulers.iter().map(|scheduler| async move {
            (scheduler.chat_id(), scheduler.process_now().await)
        }))
        .await
    }

    pub async fn len(&self) -> usize {
        self.schedulers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.schedulers.read().await.is_empty()
    }

    /// Stop every scheduler and wait for all loops to exit.
    pub async fn shutdown(&self) {
        let entries: Vec<(ChatId, SchedulerEntry)> = self.schedulers.write().await.drain().collect();
        tracing::info!(count = entries.len(), "Stopping schedulers");

        for (_, entry) in &entries {
            let _ = entry.stop.send(true);
        }

        for (chat_id, entry) in entries {
            if let Err(err) = entry.handle.await {
                tracing::error!(chat_id = %chat_id, error = %err, "Scheduler task ended abnormally");
            }
        }
    }
}
