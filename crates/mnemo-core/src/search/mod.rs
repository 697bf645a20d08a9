//! Search Module
//!
//! The retrieval pipeline:
//! - Keyword search sanitization (FTS5 MATCH + LIKE fallback)
//! - Exact vector search over a bounded candidate window
//! - Deterministic scoring (4-signal blend + boosts)
//! - Hybrid merge producing a total order

pub mod hybrid;
pub mod keyword;
pub mod scoring;
pub mod vector;

pub use keyword::{like_pattern, sanitize_match_query, MAX_QUERY_CHARS, MAX_QUERY_TERMS};

pub use vector::{
    rank_candidates, EmbeddedCandidate, VectorHit, VectorSearchOptions, DEFAULT_MAX_CANDIDATES,
    DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_VECTOR_LIMIT,
};

pub use scoring::{
    access_recency, apply_boosts, blend, decay_score, fts_signal, project_match_signal,
    rank_bounds, recency_score, staleness_penalty, ScoreWeights, Signals,
    ACCESS_HALF_LIFE_HOURS, HYBRID_BOOST, RECENCY_HALF_LIFE_HOURS, STALE_PENALTY,
};

pub use hybrid::{
    rank_merged, HybridSearchOptions, MergedCandidate, SearchResult, SearchSource,
    DEFAULT_HYBRID_LIMIT,
};
