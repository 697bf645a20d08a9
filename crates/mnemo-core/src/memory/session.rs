//! Session-scoped records: summaries, prompts, sessions, checkpoints, aliases
//!
//! Everything here is keyed by the caller's opaque session identifier.
//! Observations reference sessions weakly (no FK); checkpoints belong
//! to their session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum byte length of any single summary field
pub const MAX_SUMMARY_FIELD_BYTES: usize = 50 * 1024;

// ============================================================================
// SUMMARY
// ============================================================================

/// Per-session recap authored at the end of a work stretch
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Row identifier
    pub id: i64,
    /// Session this recap belongs to
    pub session_id: String,
    /// Project scoping label
    pub project: String,
    /// What was asked for
    pub request: Option<String>,
    /// What was looked at
    pub investigated: Option<String>,
    /// What was learned
    pub learned: Option<String>,
    /// What was finished
    pub completed: Option<String>,
    /// What comes next
    pub next_steps: Option<String>,
    /// Anything else worth keeping
    pub notes: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Creation time in ms since the Unix epoch
    pub created_at_epoch: i64,
}

/// Input for recording a summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SummaryInput {
    pub session_id: String,
    pub project: String,
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub investigated: Option<String>,
    #[serde(default)]
    pub learned: Option<String>,
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// PROMPT
// ============================================================================

/// One user prompt within a session
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: i64,
    /// Session the prompt arrived in
    pub content_session_id: String,
    pub project: String,
    /// Position within the session; unique per session
    pub prompt_number: i64,
    pub prompt_text: String,
    pub created_at_epoch: i64,
}

// ============================================================================
// SESSION
// ============================================================================

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

impl SessionStatus {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            _ => SessionStatus::Active,
        }
    }
}

/// A tracked session
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Opaque external session identifier
    pub content_session_id: String,
    pub project: String,
    pub status: SessionStatus,
    pub started_at_epoch: i64,
    pub completed_at_epoch: Option<i64>,
}

// ============================================================================
// CHECKPOINT
// ============================================================================

/// Point-in-time snapshot of where a session stands
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: i64,
    /// Session this checkpoint belongs to
    pub session_id: String,
    pub project: String,
    /// What is being worked on
    pub task: Option<String>,
    /// How far along it is
    pub progress: Option<String>,
    pub next_steps: Option<String>,
    pub open_questions: Option<String>,
    /// Comma-joined file paths in play
    pub relevant_files: Option<String>,
    /// Serialized recent observations at checkpoint time
    pub context_snapshot: Option<String>,
    pub created_at_epoch: i64,
}

/// Input for recording a checkpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckpointInput {
    pub session_id: String,
    pub project: String,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub open_questions: Option<String>,
    #[serde(default)]
    pub relevant_files: Option<String>,
    #[serde(default)]
    pub context_snapshot: Option<String>,
}

// ============================================================================
// PROJECT ALIAS & STATS
// ============================================================================

/// Display-name mapping for a project label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAlias {
    pub project_name: String,
    pub display_name: String,
}

/// Aggregate counts for a project
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub project: String,
    pub total_observations: i64,
    /// Observations of a knowledge type
    pub knowledge_observations: i64,
    /// Observations with a stored embedding
    pub embedded_observations: i64,
    pub stale_observations: i64,
    pub summaries: i64,
    pub prompts: i64,
    /// Oldest observation epoch (ms), if any
    pub first_epoch: Option<i64>,
    /// Newest observation epoch (ms), if any
    pub last_epoch: Option<i64>,
}

// ============================================================================
// TESTS
// ============================================================================
