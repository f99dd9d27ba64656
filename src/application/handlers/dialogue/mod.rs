//! The ask/final reminder dialogue.
//!
//! [`DialogueEngine`] runs one step of the dialogue, compacting oversized
//! context through [`ContextSummarizer`] and confirming stored tasks through
//! [`TaskFinalizer`].

mod context_summarizer;
mod dialogue_engine;
mod task_finalizer;

pub use context_summarizer::{
    ContextSummarizer, SummarizationBudget, SummarizedContext, SummaryRules,
};
pub use dialogue_engine::{DialogueEngine, DialogueRules};
pub use task_finalizer::{FinalizeError, TaskFinalizer};
