//! Memory Module
//!
//! Domain types for the store:
//! - Observations and their create/search inputs
//! - Session-scoped records (summaries, prompts, checkpoints)
//! - Project aliases and aggregate stats

mod observation;
mod session;

pub use observation::{
    is_knowledge_type, knowledge_boost, CreateOutcome, Observation, ObservationInput,
    SearchFilters, DEDUP_WINDOW_MS, KNOWLEDGE_TYPES, MAX_BODY_BYTES, MAX_PROJECT_BYTES,
    MAX_TITLE_BYTES,
};
pub use session::{
    Checkpoint, CheckpointInput, ProjectAlias, ProjectStats, Prompt, SessionRecord, SessionStatus,
    Summary, SummaryInput, MAX_SUMMARY_FIELD_BYTES,
};
