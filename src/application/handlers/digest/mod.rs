//! Per-chat daily digest schedulers.
//!
//! Every started chat gets a [`DailyTaskScheduler`] running on its own tokio
//! task. The [`SchedulerManager`] owns the registry of running schedulers and
//! [`TaskDigestSummarizer`] turns the day's tasks into the digest text.

mod daily_task_scheduler;
mod digest_summarizer;
mod manager;

pub(crate) use daily_task_scheduler::local_today;
pub use daily_task_scheduler::{DailyTaskScheduler, SchedulerContext};
pub use digest_summarizer::TaskDigestSummarizer;
pub use manager::SchedulerManager;
