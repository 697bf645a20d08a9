//! Observation - the atomic unit of recorded session activity
//!
//! Each observation captures one thing that happened during a coding
//! session: a file edit, a command run, a research note, a decision.
//! Observations carry project scoping, a coarse category, and the
//! timestamps the ranking pipeline decays over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// LIMITS
// ============================================================================

/// Maximum byte length of the `project` label
pub const MAX_PROJECT_BYTES: usize = 200;

/// Maximum byte length of the `title` field
pub const MAX_TITLE_BYTES: usize = 500;

/// Maximum byte length of the `text` and `narrative` fields
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Rolling window in which a repeated `content_hash` is suppressed
pub const DEDUP_WINDOW_MS: i64 = 30_000;

// ============================================================================
// KNOWLEDGE TYPES
// ============================================================================

/// Observation types that count as durable knowledge
///
/// Knowledge observations receive ranking boosts and a separate
/// retention policy with an importance exemption.
pub const KNOWLEDGE_TYPES: [&str; 4] = ["constraint", "decision", "heuristic", "rejected"];

/// Whether an observation type is a knowledge type
pub fn is_knowledge_type(obs_type: &str) -> bool {
    KNOWLEDGE_TYPES.contains(&obs_type)
}

/// Ranking boost applied to knowledge types (1.0 for everything else)
pub fn knowledge_boost(obs_type: &str) -> f64 {
    match obs_type {
        "constraint" => 1.30,
        "decision" => 1.25,
        "heuristic" => 1.15,
        "rejected" => 1.10,
        _ => 1.0,
    }
}

// ============================================================================
// OBSERVATION
// ============================================================================

/// A persisted observation
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Monotonically increasing identifier
    pub id: i64,
    /// Project scoping label
    pub project: String,
    /// Opaque session identifier supplied by the caller
    pub memory_session_id: Option<String>,
    /// Prompt counter within the session
    pub prompt_number: Option<i64>,
    /// Free-form type; `constraint`/`decision`/`heuristic`/`rejected` denote knowledge
    #[serde(rename = "type")]
    pub obs_type: String,
    /// Derived category tag (see the categorizer rule table)
    pub auto_category: Option<String>,
    /// Short required headline
    pub title: String,
    /// Optional secondary headline
    pub subtitle: Option<String>,
    /// Main body text
    pub text: Option<String>,
    /// Longer narrative form
    pub narrative: Option<String>,
    /// Structured payload, typically JSON (read by retention for `importance`)
    pub facts: Option<String>,
    /// Comma-joined concept tags
    pub concepts: Option<String>,
    /// Comma-joined file paths that were read
    pub files_read: Option<String>,
    /// Comma-joined file paths that were modified
    pub files_modified: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at_epoch: i64,
    /// Caller-supplied dedup key
    pub content_hash: Option<String>,
    /// Token cost at generation time
    pub discovery_tokens: i64,
    /// Updated on every search hit (best-effort)
    pub last_accessed_epoch: Option<i64>,
    /// Set when referenced files changed on disk after creation
    pub is_stale: bool,
}

impl Observation {
    /// Whether this observation is a knowledge type
    pub fn is_knowledge(&self) -> bool {
        is_knowledge_type(&self.obs_type)
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for creating a new observation
///
/// Uses `deny_unknown_fields` to prevent field injection attacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObservationInput {
    /// Project scoping label (required, non-empty)
    pub project: String,
    /// Observation type (required, non-empty)
    #[serde(rename = "type")]
    pub obs_type: String,
    /// Headline (required, non-empty after trimming)
    pub title: String,
    /// Opaque session identifier
    #[serde(default)]
    pub memory_session_id: Option<String>,
    /// Prompt counter within the session
    #[serde(default)]
    pub prompt_number: Option<i64>,
    /// Optional secondary headline
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Main body text
    #[serde(default)]
    pub text: Option<String>,
    /// Longer narrative form
    #[serde(default)]
    pub narrative: Option<String>,
    /// Structured payload, typically JSON
    #[serde(default)]
    pub facts: Option<String>,
    /// Comma-joined concept tags
    #[serde(default)]
    pub concepts: Option<String>,
    /// Comma-joined file paths that were read
    #[serde(default)]
    pub files_read: Option<String>,
    /// Comma-joined file paths that were modified
    #[serde(default)]
    pub files_modified: Option<String>,
    /// Dedup key over a rolling 30-second window
    #[serde(default)]
    pub content_hash: Option<String>,
    /// Token cost at generation time
    #[serde(default)]
    pub discovery_tokens: i64,
}

impl Default for ObservationInput {
    fn default() -> Self {
        Self {
            project: String::new(),
            obs_type: "note".to_string(),
            title: String::new(),
            memory_session_id: None,
            prompt_number: None,
            subtitle: None,
            text: None,
            narrative: None,
            facts: None,
            concepts: None,
            files_read: None,
            files_modified: None,
            content_hash: None,
            discovery_tokens: 0,
        }
    }
}

/// Result of a create call
///
/// `Duplicate` is a sentinel, not an error: a matching `content_hash`
/// was seen inside the dedup window and the write was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "id")]
pub enum CreateOutcome {
    /// The observation was inserted with this id
    Created(i64),
    /// Suppressed by the content-hash dedup window
    Duplicate,
}

impl CreateOutcome {
    /// The new id, if one was created
    pub fn id(&self) -> Option<i64> {
        match self {
            CreateOutcome::Created(id) => Some(*id),
            CreateOutcome::Duplicate => None,
        }
    }
}

// ============================================================================
// SEARCH FILTERS
// ============================================================================

/// Filters shared by the lexical search operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchFilters {
    /// Restrict to one project
    #[serde(default)]
    pub project: Option<String>,
    /// Restrict to one observation type
    #[serde(default, rename = "type")]
    pub obs_type: Option<String>,
    /// Inclusive lower bound on `created_at_epoch` (ms)
    #[serde(default)]
    pub date_start: Option<i64>,
    /// Inclusive upper bound on `created_at_epoch` (ms)
    #[serde(default)]
    pub date_end: Option<i64>,
    /// Maximum rows to return (no implicit cap)
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    50
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            project: None,
            obs_type: None,
            date_start: None,
            date_end: None,
            limit: default_search_limit(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_types() {
        assert!(is_knowledge_type("constraint"));
        assert!(is_knowledge_type("decision"));
        assert!(is_knowledge_type("heuristic"));
        assert!(is_knowledge_type("rejected"));
        assert!(!is_knowledge_type("command"));
        assert!(!is_knowledge_type(""));
    }

    #[test]
    fn test_knowledge_boost_ordering() {
        assert!(knowledge_boost("constraint") > knowledge_boost("decision"));
        assert!(knowledge_boost("decision") > knowledge_boost("heuristic"));
        assert!(knowledge_boost("heuristic") > knowledge_boost("rejected"));
        assert!(knowledge_boost("rejected") > knowledge_boost("file-write"));
        assert_eq!(knowledge_boost("file-write"), 1.0);
    }

    #[test]
    fn test_input_deny_unknown_fields() {
        let json = r#"{"project": "p", "type": "note", "title": "t"}"#;
        let result: Result<ObservationInput, _> = serde_json::from_str(json);
        assert!(result.is_ok());

        let json_with_unknown =
            r#"{"project": "p", "type": "note", "title": "t", "malicious_field": "attack"}"#;
        let result: Result<ObservationInput, _> = serde_json::from_str(json_with_unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_outcome_id() {
        assert_eq!(CreateOutcome::Created(7).id(), Some(7));
        assert_eq!(CreateOutcome::Duplicate.id(), None);
    }

    #[test]
    fn test_search_filters_default_limit() {
        let filters = SearchFilters::default();
        assert_eq!(filters.limit, 50);
        assert!(filters.project.is_none());
    }
}
