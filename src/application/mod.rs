//! Application layer - Dialogue, finalization and digest orchestration.
//!
//! Components here coordinate the domain with the ports. They hold their
//! collaborators as `Arc<dyn Port>` and never surface provider errors to the
//! user; failures degrade to fixed replies.

pub mod handlers;

pub use handlers::{
    ChatService, ContextSummarizer, DailyTaskScheduler, DialogueEngine, DialogueRules,
    FinalizeError, SchedulerContext, SchedulerManager, SummarizationBudget, SummarizedContext,
    SummaryRules, TaskDigestSummarizer, TaskFinalizer,
};
