//! Application handlers.
//!
//! Use cases grouped by area: chat commands, the reminder dialogue and the
//! daily digest.

pub mod chat;
pub mod dialogue;
pub mod digest;

pub use chat::ChatService;
pub use dialogue::{
    ContextSummarizer, DialogueEngine, DialogueRules, FinalizeError, SummarizationBudget,
    SummarizedContext, SummaryRules, TaskFinalizer,
};
pub use digest::{DailyTaskScheduler, SchedulerContext, SchedulerManager, TaskDigestSummarizer};
