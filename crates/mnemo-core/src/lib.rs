//! # Mnemo Core
//!
//! Persistent memory engine for coding-assistant sessions. Records
//! observations (file edits, commands, research notes, decisions),
//! session summaries, checkpoints, and structured knowledge, then
//! serves ranked context back on demand.
//!
//! - **Hybrid Retrieval**: FTS5/BM25 keyword search fused with exact
//!   cosine vector search over a bounded candidate window
//! - **Deterministic Scoring**: 4-signal linear blend (semantic,
//!   keyword, recency, project) with hybrid and knowledge-type boosts
//! - **Write Hygiene**: secret redaction, content-hash dedup window,
//!   weighted auto-categorization
//! - **Decay & Upkeep**: exponential recency decay, file-mtime
//!   staleness, duplicate consolidation, per-class retention
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mnemo_core::{HybridSearchOptions, ObservationInput, Storage};
//!
//! // Create storage (uses default platform-specific location)
//! let storage = Storage::new(None)?;
//!
//! // Record an observation
//! let input = ObservationInput {
//!     project: "my-app".to_string(),
//!     obs_type: "decision".to_string(),
//!     title: "use sqlite for the queue".to_string(),
//!     ..Default::default()
//! };
//! let outcome = storage.create_observation(input)?;
//!
//! // Search it back
//! let results = storage.hybrid_search("queue storage", &HybridSearchOptions::default())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `embeddings` (default): local embedding generation with fastembed;
//!   without it the semantic signal degrades to zero and search is
//!   keyword-only
//! - `bundled-sqlite` (default): compile SQLite (with FTS5) into the
//!   binary

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod categorize;
pub mod context;
pub mod embeddings;
pub mod memory;
pub mod redaction;
pub mod search;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Memory types
pub use memory::{
    is_knowledge_type, knowledge_boost, Checkpoint, CheckpointInput, CreateOutcome, Observation,
    ObservationInput, ProjectAlias, ProjectStats, Prompt, SearchFilters, SessionRecord,
    SessionStatus, Summary, SummaryInput, KNOWLEDGE_TYPES,
};

// Storage layer
pub use storage::{
    ConsolidateOptions, ConsolidationOutcome, Result, RetentionConfig, RetentionOutcome, Storage,
    StorageError, MAX_BULK_IDS,
};

// Search pipeline
pub use search::{
    HybridSearchOptions, ScoreWeights, SearchResult, SearchSource, VectorHit, VectorSearchOptions,
};

// Embeddings
pub use embeddings::{
    cosine_similarity, discover, Embedding, EmbeddingProvider, ProviderStatus, UnavailableProvider,
};

// Redaction and categorization
pub use categorize::{categorize, CategorizeInput};
pub use redaction::{redact, REDACTED_MARKER};

// Context assembly
pub use context::{estimated_tokens, ContextItem, SmartContext};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        CreateOutcome, HybridSearchOptions, Observation, ObservationInput, Result,
        RetentionConfig, ScoreWeights, SearchFilters, SearchResult, SmartContext, Storage,
        StorageError, SummaryInput,
    };

    pub use crate::{EmbeddingProvider, ProviderStatus};
}
